//! Inverted index construction.
//!
//! Each conversation is tokenized independently into its own postings, so that step can
//! run on the rayon pool; postings are then merged into the shared map sequentially in
//! corpus order, which keeps every token's posting list ordered like the corpus.

use std::collections::BTreeMap;

use rayon::prelude::*;

use super::tokenizer::{extract_context_chars, find_from, folded_chars, tokenize};
use crate::config::IndexConfig;
use crate::models::{ConversationIndexEntry, InvertedIndex, Posting};

/// Postings for a single conversation, keyed by token.
pub fn conversation_postings(
    conversation_id: &str,
    searchable_text: &str,
    config: &IndexConfig,
) -> BTreeMap<String, Posting> {
    let original: Vec<char> = searchable_text.chars().collect();
    let lowered = folded_chars(searchable_text);

    // Forward scan: each token is searched from where the previous match ended, so
    // offsets never decrease and one substring is never matched twice.
    let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    let mut cursor = 0;
    for token in tokenize(searchable_text) {
        let needle: Vec<char> = token.chars().collect();
        if let Some(offset) = find_from(&lowered, &needle, cursor) {
            cursor = offset + needle.len();
            positions.entry(token).or_default().push(offset);
        }
    }

    positions
        .into_iter()
        .map(|(token, offsets)| {
            let snippets = offsets
                .iter()
                .take(config.max_posting_snippets)
                .map(|&offset| extract_context_chars(&original, offset, config.snippet_context))
                .collect();
            let posting = Posting {
                conversation_id: conversation_id.to_string(),
                frequency: offsets.len(),
                positions: offsets,
                snippets,
            };
            (token, posting)
        })
        .collect()
}

/// Build a fresh inverted index over `conversations`.
pub fn build_inverted_index(
    conversations: &[ConversationIndexEntry],
    config: &IndexConfig,
) -> InvertedIndex {
    let per_conversation: Vec<BTreeMap<String, Posting>> = if config.parallel {
        conversations
            .par_iter()
            .map(|c| conversation_postings(&c.id, &c.searchable_text, config))
            .collect()
    } else {
        conversations
            .iter()
            .map(|c| conversation_postings(&c.id, &c.searchable_text, config))
            .collect()
    };

    let mut index = InvertedIndex::new();
    for postings in per_conversation {
        for (token, posting) in postings {
            index.entry(token).or_default().push(posting);
        }
    }
    index
}
