//! Filter expression parser.
//!
//! Turns a compact, user-typed filter string into [`SearchFilters`].
//!
//! # Syntax
//!
//! ```text
//! filter_expr  := field_filter*
//! field_filter := field_name:value | field_name:"quoted value"
//! field_name   := scope | time | model (case-insensitive)
//! ```
//!
//! # Supported Fields
//!
//! - `scope:user|assistant|tools|all` - Restrict the raw-query match to one part of a conversation
//! - `time:today|week|month|all` - Recency window from the conversation start
//! - `model:name` - Repeatable; a conversation passes if it used any listed model
//!
//! # Examples
//!
//! ```rust
//! # use transcript_search::filters::parser::parse_filter;
//! # use transcript_search::filters::{Scope, TimeRange};
//! let filters = parse_filter("scope:user time:week model:a model:\"b c\"").unwrap();
//! assert_eq!(filters.scope, Scope::User);
//! assert_eq!(filters.time_range, TimeRange::Week);
//! assert_eq!(filters.models.len(), 2);
//! ```
//!
//! # Validation
//!
//! Unknown fields and unrecognized values are skipped with a warning, leaving that
//! dimension unfiltered. Only malformed input is rejected: a token without `field:value`
//! shape, an empty field or value, or an unterminated quote.

use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use super::ast::{Scope, SearchFilters, TimeRange};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldValue {
    field: String,
    value: String,
}

/// Split filter input into `field:value` pairs
fn tokenize(input: &str) -> Result<Vec<FieldValue>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let word = read_word(&mut chars);
        let Some(colon_pos) = word.find(':') else {
            return Err(anyhow!("Invalid token: '{}' (expected field:value)", word));
        };

        let field = word[..colon_pos].to_string();
        let mut value = word[colon_pos + 1..].to_string();
        if value.starts_with('"') {
            value = read_quoted_value(&mut chars, &value)?;
        }

        if field.is_empty() || value.is_empty() {
            return Err(anyhow!("Invalid field:value format: {}", word));
        }

        tokens.push(FieldValue { field, value });
    }

    Ok(tokens)
}

fn read_word(chars: &mut Peekable<Chars>) -> String {
    let mut word = String::new();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            break;
        }
        word.push(ch);
        chars.next();
    }

    word
}

/// Read a quoted value whose opening quote (and possibly more) is already in `initial`
fn read_quoted_value(chars: &mut Peekable<Chars>, initial: &str) -> Result<String> {
    let mut value = initial[1..].to_string();

    if let Some(quote_pos) = value.find('"') {
        return Ok(value[..quote_pos].to_string());
    }

    for ch in chars.by_ref() {
        if ch == '"' {
            return Ok(value);
        }
        value.push(ch);
    }

    Err(anyhow!("Unterminated quoted string"))
}

/// Parse a filter string into [`SearchFilters`]
///
/// Examples:
/// - "scope:tools" → tool-name scope
/// - "model:a model:b" → either model
/// - "time:month scope:user" → both restrictions
/// - "model:\"custom model\"" → quoted value containing spaces
pub fn parse_filter(input: &str) -> Result<SearchFilters> {
    let mut filters = SearchFilters::default();
    if input.trim().is_empty() {
        return Ok(filters);
    }

    let tokens = tokenize(input).context("Failed to tokenize filter")?;

    for FieldValue { field, value } in tokens {
        match field.to_lowercase().as_str() {
            "scope" => {
                let scope = Scope::from(value.as_str());
                if scope == Scope::All && !value.eq_ignore_ascii_case("all") {
                    warn!(value = %value, "Unrecognized scope, ignoring");
                }
                filters.scope = scope;
            }
            "time" => {
                let range = TimeRange::from(value.as_str());
                if range == TimeRange::All && !value.eq_ignore_ascii_case("all") {
                    warn!(value = %value, "Unrecognized time range, ignoring");
                }
                filters.time_range = range;
            }
            "model" | "models" => {
                filters.models.insert(value);
            }
            _ => warn!(field = %field, "Unknown filter field, ignoring"),
        }
    }

    Ok(filters)
}
