//! Index building for archived conversation transcripts
//!
//! Data flows one way: transcript pairs → [`extractor`] → searchable text →
//! [`tokenizer`] / [`inverted`] postings → [`builder`] assembles the final [`SearchIndex`].
//!
//! # Concurrency
//!
//! Extraction and per-conversation tokenization are independent per conversation and run
//! on the rayon pool (see [`IndexConfig::parallel`]). Results are collected in corpus order
//! and merged into the token map on one thread, so parallel and sequential builds produce
//! identical documents.
//!
//! [`SearchIndex`]: crate::models::SearchIndex
//! [`IndexConfig::parallel`]: crate::config::IndexConfig::parallel

pub mod builder;
pub mod extractor;
pub mod inverted;
pub mod tokenizer;

pub use builder::{SummaryMap, build_index, build_index_from_source};
pub use extractor::{ExtractedContent, extract_content};
pub use inverted::{build_inverted_index, conversation_postings};
pub use tokenizer::{extract_context, tokenize};
