use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::scoring::{
    QueryTerm, TermExpander, inverse_document_frequency, query_terms, term_frequency_weight,
};
use super::snippets::{Highlighter, result_snippets};
use crate::config::SearchConfig;
use crate::filters::{SearchFilters, passes_filters};
use crate::indexer::tokenize;
use crate::models::{SearchIndex, SearchResult};

/// Tokens of the short, boosted fields of one conversation
#[derive(Debug, Default)]
struct FieldTokens {
    title: BTreeSet<String>,
    summary: BTreeSet<String>,
}

/// Read-only query executor over a built [`SearchIndex`].
///
/// Construction precomputes title/summary tokens and an id lookup; after that every query
/// only reads, so one engine can serve any number of threads.
pub struct SearchEngine<'a> {
    index: &'a SearchIndex,
    config: SearchConfig,
    /// Conversation id → position in `index.conversations` (first occurrence wins)
    positions: HashMap<&'a str, usize>,
    fields: Vec<FieldTokens>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(index: &'a SearchIndex, config: SearchConfig) -> Self {
        let mut positions = HashMap::with_capacity(index.conversations.len());
        for (position, entry) in index.conversations.iter().enumerate() {
            positions.entry(entry.id.as_str()).or_insert(position);
        }

        let fields = index
            .conversations
            .iter()
            .map(|entry| FieldTokens {
                title: tokenize(&entry.title).into_iter().collect(),
                summary: entry
                    .summary
                    .as_deref()
                    .map(|summary| tokenize(summary).into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect();

        Self { index, config, positions, fields }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Ranked results for `query`, with the time filter measured from the wall clock
    pub fn search(&self, query: &str, filters: &SearchFilters) -> Vec<SearchResult> {
        self.search_at(query, filters, Utc::now())
    }

    /// Ranked results for `query`, with the time filter measured from `now`.
    ///
    /// Steps: score every conversation against the query terms, keep candidates with a
    /// positive score that pass `filters`, sort by score (ties keep corpus order), truncate
    /// to the result limit and attach highlighted snippets.
    pub fn search_at(
        &self,
        query: &str,
        filters: &SearchFilters,
        now: DateTime<Utc>,
    ) -> Vec<SearchResult> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let term_texts = query_terms(query, self.config.max_query_terms);
        let mut expander = TermExpander::new(&self.config);
        let terms: Vec<QueryTerm> =
            term_texts.iter().map(|text| expander.term(text.as_str())).collect();

        let scores = self.score_conversations(&terms, &mut expander);

        let mut ranked: Vec<(usize, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|&(_, score)| score > 0.0)
            .filter(|&(position, _)| {
                passes_filters(&self.index.conversations[position], filters, query, now)
            })
            .collect();

        // Stable sort: equal scores stay in corpus order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let matched = ranked.len();
        ranked.truncate(self.config.result_limit);

        debug!(
            query = %query,
            terms = term_texts.len(),
            matched,
            returned = ranked.len(),
            "Search complete"
        );

        let highlighter = Highlighter::new(
            &term_texts,
            &self.config.highlight_open,
            &self.config.highlight_close,
        );

        ranked
            .into_iter()
            .map(|(position, score)| {
                let entry = &self.index.conversations[position];
                SearchResult {
                    id: entry.id.clone(),
                    score,
                    title: entry.title.clone(),
                    start_time: entry.start_time.clone(),
                    models: entry.models.clone(),
                    message_count: entry.message_count,
                    snippets: result_snippets(
                        entry,
                        &term_texts,
                        filters.scope,
                        &highlighter,
                        &self.config,
                    ),
                }
            })
            .collect()
    }

    /// Relevance score per conversation, indexed like `index.conversations`
    fn score_conversations(
        &self,
        terms: &[QueryTerm],
        expander: &mut TermExpander<'_>,
    ) -> Vec<f64> {
        let total = self.index.conversations.len();
        let mut scores = vec![0.0; total];

        for term in terms {
            // Best body weight per conversation for this term, so a conversation matching
            // several expansions of one term is counted once
            let mut body: HashMap<usize, f64> = HashMap::new();
            for (token, quality) in expander.expand(term, &self.index.inverted_index) {
                let Some(postings) = self.index.inverted_index.get(token) else {
                    continue;
                };
                let idf = inverse_document_frequency(total, postings.len());
                for posting in postings {
                    let Some(&position) = self.positions.get(posting.conversation_id.as_str())
                    else {
                        continue;
                    };
                    let weight = quality
                        * idf
                        * term_frequency_weight(posting.frequency)
                        * self.config.body_boost;
                    let best = body.entry(position).or_insert(0.0);
                    *best = best.max(weight);
                }
            }
            for (position, weight) in body {
                scores[position] += weight;
            }

            for (position, fields) in self.fields.iter().enumerate() {
                scores[position] += expander.best_quality(term, &fields.title)
                    * self.config.title_boost
                    + expander.best_quality(term, &fields.summary) * self.config.summary_boost;
            }
        }

        scores
    }
}
