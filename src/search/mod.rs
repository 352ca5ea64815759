//! Query execution over a built search index
//!
//! Retrieval is fuzzy and token based ([`scoring`]); filtering afterwards is exact and
//! works on raw text ([`crate::filters`]). The two deliberately disagree: a scope filter
//! only passes conversations whose scoped text contains the literal query, whatever the
//! fuzzy score says.

pub mod engine;
pub mod scoring;
pub mod snippets;

pub use engine::SearchEngine;
pub use scoring::{TermExpander, query_terms};
pub use snippets::{Highlighter, result_snippets};
