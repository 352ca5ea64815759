use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One ranked query hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: String,
    pub score: f64,
    pub title: String,
    pub start_time: String,
    pub models: BTreeSet<String>,
    pub message_count: usize,
    pub snippets: Vec<String>,
}
