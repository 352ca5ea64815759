pub mod environment;
pub mod paths;

pub use environment::{TRACE_DIR_ENV, get_trace_dir};
pub use paths::{open_bounded_file, rendered_document_path};
