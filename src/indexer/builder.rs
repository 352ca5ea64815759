//! Index assembler for archived conversation transcripts.
//!
//! # Error Handling Strategy
//!
//! - **Record-level failures**: A conversation whose payload cannot be parsed at all is
//!   logged and dropped; the rest of the batch is still indexed.
//! - **Field-level failures**: Malformed transcript fields degrade to empty values inside
//!   the parsers and extractor, so they never reach this module as errors.
//! - **Hard failures**: Only loading the conversation list itself (see
//!   [`build_index_from_source`]) or serializing the finished document fails the build.
//!
//! Every call builds into fresh local accumulators, so nothing carries over between builds.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::extractor::extract_content;
use super::inverted::build_inverted_index;
use crate::config::IndexConfig;
use crate::models::{
    ConversationIndexEntry, ConversationSummary, DateRange, INDEX_VERSION, RawConversation,
    SearchIndex, SearchMetadata, TokenUsage, TranscriptPair,
};
use crate::parsers::{ConversationSource, parse_transcript};

const TITLE_ELLIPSIS: &str = "...";

/// Summaries keyed by conversation id
pub type SummaryMap = HashMap<String, ConversationSummary>;

/// Build a search index from already-loaded conversation records.
///
/// Records that cannot be parsed are skipped with a warning.
///
/// # Errors
///
/// Returns an error only if the finished document cannot be serialized to measure its size.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use transcript_search::config::IndexConfig;
/// use transcript_search::indexer::build_index;
/// use transcript_search::models::RawConversation;
///
/// let conversations = vec![RawConversation {
///     id: "conv-1".to_string(),
///     log_file: "log-1.jsonl".to_string(),
///     html_file: None,
///     payload: json!([{
///         "request": {"messages": [{"role": "user", "content": "Fix the login flow"}]},
///         "response": {"content": [{"type": "text", "text": "Done"}]}
///     }]),
/// }];
///
/// let index = build_index(&conversations, None, &IndexConfig::default())?;
/// assert_eq!(index.len(), 1);
/// assert!(index.inverted_index.contains_key("login"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_index(
    conversations: &[RawConversation],
    summaries: Option<&SummaryMap>,
    config: &IndexConfig,
) -> Result<SearchIndex> {
    let built: Vec<Option<ConversationIndexEntry>> = if config.parallel {
        conversations.par_iter().map(|raw| build_entry(raw, summaries, config)).collect()
    } else {
        conversations.iter().map(|raw| build_entry(raw, summaries, config)).collect()
    };

    let dropped = built.iter().filter(|entry| entry.is_none()).count();
    let entries: Vec<ConversationIndexEntry> = built.into_iter().flatten().collect();

    let inverted_index = build_inverted_index(&entries, config);
    let index_size = serde_json::to_vec(&(&entries, &inverted_index))
        .context("Failed to serialize index for size accounting")?
        .len();

    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let metadata = compute_metadata(&entries, index_size, &generated_at);

    info!(
        conversations = entries.len(),
        dropped,
        tokens = inverted_index.len(),
        index_size,
        "Built search index"
    );

    Ok(SearchIndex {
        version: INDEX_VERSION,
        generated_at,
        conversations: entries,
        inverted_index,
        metadata,
    })
}

/// Load conversations from `source` and build an index over them.
///
/// # Errors
///
/// Returns an error if the source cannot produce its conversation list.
pub fn build_index_from_source<S>(
    source: &S,
    summaries: Option<&SummaryMap>,
    config: &IndexConfig,
) -> Result<SearchIndex>
where
    S: ConversationSource + ?Sized,
{
    let conversations = source.load().context("Failed to load conversations")?;
    build_index(&conversations, summaries, config)
}

fn build_entry(
    raw: &RawConversation,
    summaries: Option<&SummaryMap>,
    config: &IndexConfig,
) -> Option<ConversationIndexEntry> {
    let pairs = match parse_transcript(&raw.payload) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!(
                id = %raw.id,
                log_file = %raw.log_file,
                error = %e,
                "Skipping unparseable conversation"
            );
            return None;
        }
    };

    let content = extract_content(&pairs, config.max_scan_depth);
    let (start_time, end_time) = time_bounds(&pairs);
    let summary = summaries.and_then(|s| s.get(&raw.id));

    let title = match summary.filter(|s| !s.title.trim().is_empty()) {
        Some(summary) => summary.title.clone(),
        None => fallback_title(&content.user_messages, &start_time, config.title_length),
    };

    let mut total_tokens = TokenUsage::default();
    let mut models = BTreeSet::new();
    for pair in &pairs {
        if let Some(usage) = &pair.response.usage {
            total_tokens.add(&TokenUsage {
                input: usage.input_tokens,
                output: usage.output_tokens,
                cached: usage.cache_read_input_tokens,
            });
        }
        for model in [&pair.request.model, &pair.response.model].into_iter().flatten() {
            if !model.is_empty() {
                models.insert(model.clone());
            }
        }
    }

    debug!(id = %raw.id, pairs = pairs.len(), "Indexed conversation");

    Some(ConversationIndexEntry {
        id: raw.id.clone(),
        log_file: raw.log_file.clone(),
        html_file: raw.html_file.clone(),
        title,
        summary: summary.and_then(|s| s.summary.clone()),
        start_time,
        end_time,
        message_count: pairs.len(),
        models,
        total_tokens,
        searchable_text: content.searchable_text(),
        user_messages: content.user_messages,
        assistant_messages: content.assistant_messages,
        tool_calls: content.tool_calls,
        file_paths: content.file_paths,
        errors: content.errors,
        system_prompt: content.system_prompt,
    })
}

/// First request timestamp and last response timestamp, each falling back to the other
/// side of the exchange when missing.
fn time_bounds(pairs: &[TranscriptPair]) -> (String, String) {
    let start = pairs
        .iter()
        .find_map(|p| p.request.timestamp.clone().or_else(|| p.response.timestamp.clone()))
        .unwrap_or_default();
    let end = pairs
        .iter()
        .rev()
        .find_map(|p| p.response.timestamp.clone().or_else(|| p.request.timestamp.clone()))
        .unwrap_or_else(|| start.clone());
    (start, end)
}

fn fallback_title(user_messages: &[String], start_time: &str, max_chars: usize) -> String {
    let Some(first) = user_messages.first() else {
        return format!("Conversation {}", start_time);
    };

    if first.chars().count() > max_chars {
        let truncated: String = first.chars().take(max_chars).collect();
        format!("{}{}", truncated, TITLE_ELLIPSIS)
    } else {
        first.clone()
    }
}

fn compute_metadata(
    entries: &[ConversationIndexEntry],
    index_size: usize,
    generated_at: &str,
) -> SearchMetadata {
    let mut token_usage = TokenUsage::default();
    let mut model_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut earliest: Option<&str> = None;
    let mut latest: Option<&str> = None;

    for entry in entries {
        token_usage.add(&entry.total_tokens);
        for model in &entry.models {
            *model_counts.entry(model.clone()).or_default() += 1;
        }
        // Lexicographic comparison is sound because timestamps are normalized to one
        // fixed-width UTC format when parsed.
        if !entry.start_time.is_empty() && earliest.is_none_or(|e| entry.start_time.as_str() < e) {
            earliest = Some(entry.start_time.as_str());
        }
        if !entry.end_time.is_empty() && latest.is_none_or(|l| entry.end_time.as_str() > l) {
            latest = Some(entry.end_time.as_str());
        }
    }

    SearchMetadata {
        total_conversations: entries.len(),
        total_tokens: token_usage.total(),
        token_usage,
        date_range: DateRange {
            earliest: earliest.map(str::to_string),
            latest: latest.map(str::to_string),
        },
        model_counts,
        index_size,
        generated_at: generated_at.to_string(),
    }
}
