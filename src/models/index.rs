use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Index document format version, bumped on incompatible layout changes
pub const INDEX_VERSION: u32 = 1;

/// A tool invocation as it appears in searchable text: `name: serializedInput`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub input: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub cached: u64,
}

/// Counts come from untrusted transcript usage fields, so sums saturate at `u64::MAX`.
impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.input = self.input.saturating_add(other.input);
        self.output = self.output.saturating_add(other.output);
        self.cached = self.cached.saturating_add(other.cached);
    }

    pub fn total(&self) -> u64 {
        self.input.saturating_add(self.output)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationIndexEntry {
    pub id: String,
    pub log_file: String,
    pub html_file: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub message_count: usize,
    pub models: BTreeSet<String>,
    pub total_tokens: TokenUsage,
    pub searchable_text: String,
    pub user_messages: Vec<String>,
    pub assistant_messages: Vec<String>,
    pub tool_calls: Vec<ToolCall>,
    pub file_paths: BTreeSet<String>,
    pub errors: Vec<String>,
    pub system_prompt: String,
}

/// Occurrences of one token inside one conversation's searchable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    pub conversation_id: String,
    /// Character offsets, non-decreasing
    pub positions: Vec<usize>,
    pub frequency: usize,
    pub snippets: Vec<String>,
}

/// Token → one posting per conversation, in corpus order.
pub type InvertedIndex = BTreeMap<String, Vec<Posting>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: Option<String>,
    pub latest: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMetadata {
    pub total_conversations: usize,
    pub total_tokens: u64,
    pub token_usage: TokenUsage,
    pub date_range: DateRange,
    pub model_counts: BTreeMap<String, usize>,
    pub index_size: usize,
    pub generated_at: String,
}

/// Root index document. Built once, then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndex {
    pub version: u32,
    pub generated_at: String,
    pub conversations: Vec<ConversationIndexEntry>,
    pub inverted_index: InvertedIndex,
    pub metadata: SearchMetadata,
}

impl SearchIndex {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize search index")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let index: SearchIndex =
            serde_json::from_str(json).context("Failed to parse search index JSON")?;
        if index.version != INDEX_VERSION {
            anyhow::bail!(
                "Unsupported search index version (expected {}, found {})",
                INDEX_VERSION,
                index.version
            );
        }
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
