pub mod apply;
pub mod ast;
pub mod parser;

pub use apply::{apply_filters, passes_filters, scope_text};
pub use ast::{Scope, SearchFilters, TimeRange};
pub use parser::parse_filter;
