//! Transcript Search - index and query archived LLM conversation transcripts
//!
//! This library turns a corpus of request/response transcripts into one immutable,
//! serializable search document and answers ranked queries against it. It supports:
//!
//! - Extracting user, assistant and tool-call content from transcript pairs
//! - Building an inverted index with character offsets and context snippets
//! - Assembling per-conversation entries and corpus metadata into a versioned document
//! - Fuzzy, prefix-tolerant retrieval with scope, model and time filters
//! - Loading transcripts from a directory of `*.jsonl` logs
//! - Persisting the index document with atomic writes
//!
//! # Example
//!
//! ```no_run
//! use transcript_search::{
//!     IndexConfig, SearchConfig, SearchEngine, TraceDirectory, build_index_from_source,
//!     parse_filter,
//! };
//!
//! let source = TraceDirectory::new("/var/log/claude-trace");
//! let index = build_index_from_source(&source, None, &IndexConfig::default())?;
//! println!("Indexed {} conversations", index.len());
//!
//! let engine = SearchEngine::new(&index, SearchConfig::default());
//! let filters = parse_filter("scope:user time:week")?;
//! for result in engine.search("authentication", &filters) {
//!     println!("{:.2} {}", result.score, result.title);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod filters;
pub mod index_storage;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod search;
pub mod utils;

// Re-export commonly used types
pub use config::{IndexConfig, SearchConfig};
pub use filters::{Scope, SearchFilters, TimeRange, parse_filter};
pub use index_storage::{load_index, save_index};
pub use indexer::{build_index, build_index_from_source, extract_context, tokenize};
pub use models::{RawConversation, SearchIndex, SearchResult};
pub use parsers::{ConversationSource, TraceDirectory};
pub use search::SearchEngine;
