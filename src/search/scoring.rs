//! Query term expansion and relevance weights.
//!
//! A query term matches an index token in one of three ways, each with its own quality:
//! an exact match (1.0), a prefix match ([`SearchConfig::prefix_weight`]) or a fuzzy match
//! scored by `nucleo` and normalized against the term's score on itself, then scaled by
//! [`SearchConfig::fuzzy_weight`]. Fuzzy matching only considers tokens whose length is
//! within 20% of the term's.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use nucleo::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo::{Config, Matcher, Utf32Str};

use crate::config::SearchConfig;
use crate::indexer::tokenize;

/// Terms shorter than this never match by prefix
const MIN_PREFIX_LEN: usize = 3;

/// Allowed length difference for fuzzy candidates, relative to the term length
const FUZZY_LENGTH_TOLERANCE: f64 = 0.2;

/// Normalized query terms: index tokenization first, whitespace words if that leaves nothing.
///
/// Duplicates are removed (first occurrence wins) and the list is capped at `max_terms`.
pub fn query_terms(query: &str, max_terms: usize) -> Vec<String> {
    let mut terms = tokenize(query);
    if terms.is_empty() {
        terms = query.split_whitespace().map(str::to_lowercase).collect();
    }

    let mut seen = BTreeSet::new();
    terms.retain(|term| seen.insert(term.clone()));
    terms.truncate(max_terms);
    terms
}

/// Inverse document frequency: `ln(1 + total / df)`
pub fn inverse_document_frequency(total_documents: usize, document_frequency: usize) -> f64 {
    if document_frequency == 0 {
        return 0.0;
    }
    (1.0 + total_documents as f64 / document_frequency as f64).ln()
}

/// Sublinear term frequency: `1 + ln(tf)`
pub fn term_frequency_weight(frequency: usize) -> f64 {
    1.0 + (frequency.max(1) as f64).ln()
}

/// A query term prepared for matching
pub struct QueryTerm {
    pub text: String,
    char_len: usize,
    /// Fuzzy pattern and the term's score against itself
    fuzzy: Option<(Pattern, f64)>,
}

/// Scores index tokens against query terms.
///
/// Holds a `nucleo` matcher and its scratch buffer, so one expander serves a whole query
/// and is never shared between threads.
pub struct TermExpander<'c> {
    config: &'c SearchConfig,
    matcher: Matcher,
    buf: Vec<char>,
}

impl<'c> TermExpander<'c> {
    pub fn new(config: &'c SearchConfig) -> Self {
        Self { config, matcher: Matcher::new(Config::DEFAULT), buf: Vec::new() }
    }

    pub fn term(&mut self, text: impl Into<String>) -> QueryTerm {
        let text = text.into();
        let char_len = text.chars().count();

        let fuzzy = if char_len >= self.config.fuzzy_min_len {
            let pattern =
                Pattern::new(&text, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);
            let haystack = Utf32Str::new(&text, &mut self.buf);
            pattern
                .score(haystack, &mut self.matcher)
                .filter(|&score| score > 0)
                .map(|score| (pattern, f64::from(score)))
        } else {
            None
        };

        QueryTerm { text, char_len, fuzzy }
    }

    /// Match quality of `token` for `term`, or `None` if they do not match.
    pub fn quality(&mut self, term: &QueryTerm, token: &str) -> Option<f64> {
        if token == term.text {
            return Some(1.0);
        }
        if term.char_len >= MIN_PREFIX_LEN && token.starts_with(&term.text) {
            return Some(self.config.prefix_weight);
        }
        self.fuzzy_quality(term, token)
    }

    fn fuzzy_quality(&mut self, term: &QueryTerm, token: &str) -> Option<f64> {
        let (pattern, self_score) = term.fuzzy.as_ref()?;

        let token_len = token.chars().count();
        let tolerance = term.char_len as f64 * FUZZY_LENGTH_TOLERANCE;
        if (token_len as f64 - term.char_len as f64).abs() > tolerance {
            return None;
        }

        let haystack = Utf32Str::new(token, &mut self.buf);
        let score = pattern.score(haystack, &mut self.matcher)?;
        let ratio = (f64::from(score) / self_score).min(1.0);
        Some(ratio * self.config.fuzzy_weight)
    }

    /// Every vocabulary key that matches `term`, with its quality, in key order.
    pub fn expand<'v, V>(
        &mut self,
        term: &QueryTerm,
        vocabulary: &'v BTreeMap<String, V>,
    ) -> Vec<(&'v str, f64)> {
        let mut matches = Vec::new();

        if let Some((token, _)) = vocabulary.get_key_value(&term.text) {
            matches.push((token.as_str(), 1.0));
        }

        if term.char_len >= MIN_PREFIX_LEN {
            let after_exact = (Bound::Excluded(term.text.clone()), Bound::Unbounded);
            matches.extend(
                vocabulary
                    .range::<String, _>(after_exact)
                    .map(|(token, _)| token.as_str())
                    .take_while(|token| token.starts_with(&term.text))
                    .map(|token| (token, self.config.prefix_weight)),
            );
        }

        if term.fuzzy.is_some() {
            for token in vocabulary.keys() {
                if token.starts_with(&term.text) {
                    continue;
                }
                if let Some(quality) = self.fuzzy_quality(term, token) {
                    matches.push((token.as_str(), quality));
                }
            }
        }

        matches
    }

    /// Highest match quality of `term` over a small token set (title or summary tokens).
    pub fn best_quality(&mut self, term: &QueryTerm, tokens: &BTreeSet<String>) -> f64 {
        if tokens.contains(&term.text) {
            return 1.0;
        }
        tokens
            .iter()
            .filter_map(|token| self.quality(term, token))
            .fold(0.0, f64::max)
    }
}
