//! Tunables for index building and query execution.
//!
//! Both structs deserialize with `#[serde(default)]`, so callers can embed a partial
//! section in their own config file and inherit the defaults for everything else.

use serde::{Deserialize, Serialize};

/// Characters kept on each side of a match in posting and result snippets
pub const DEFAULT_SNIPPET_CONTEXT: usize = 60;
/// Snippets kept per posting and per search result
pub const DEFAULT_MAX_SNIPPETS: usize = 3;
/// Characters of the first user message used as a fallback title
pub const DEFAULT_TITLE_LENGTH: usize = 60;
/// Nesting depth cap for the file-reference scan over tool inputs
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 32;
/// Results returned per query
pub const DEFAULT_RESULT_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub snippet_context: usize,
    pub max_posting_snippets: usize,
    pub title_length: usize,
    pub max_scan_depth: usize,
    /// Extract and tokenize conversations on the rayon pool
    pub parallel: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            snippet_context: DEFAULT_SNIPPET_CONTEXT,
            max_posting_snippets: DEFAULT_MAX_SNIPPETS,
            title_length: DEFAULT_TITLE_LENGTH,
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub result_limit: usize,
    pub snippet_context: usize,
    pub max_snippets: usize,
    pub title_boost: f64,
    pub summary_boost: f64,
    pub body_boost: f64,
    /// Match quality of an index token that merely starts with the query term
    pub prefix_weight: f64,
    /// Upper bound on the match quality of a fuzzy (non-prefix) token match
    pub fuzzy_weight: f64,
    /// Shorter terms only match exactly or by prefix
    pub fuzzy_min_len: usize,
    pub max_query_terms: usize,
    pub highlight_open: String,
    pub highlight_close: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: DEFAULT_RESULT_LIMIT,
            snippet_context: DEFAULT_SNIPPET_CONTEXT,
            max_snippets: DEFAULT_MAX_SNIPPETS,
            title_boost: 3.0,
            summary_boost: 2.0,
            body_boost: 1.0,
            prefix_weight: 0.75,
            fuzzy_weight: 0.5,
            fuzzy_min_len: 4,
            max_query_terms: 16,
            highlight_open: "<mark>".to_string(),
            highlight_close: "</mark>".to_string(),
        }
    }
}
