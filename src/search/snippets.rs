//! Highlighted result snippets.

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

use crate::config::SearchConfig;
use crate::filters::Scope;
use crate::indexer::tokenizer::{extract_context_chars, find_from, folded_chars};
use crate::models::ConversationIndexEntry;

/// Wraps every case-insensitive occurrence of the query terms in highlight markers
pub struct Highlighter {
    regex: Option<Regex>,
    open: String,
    close: String,
}

impl Highlighter {
    pub fn new(terms: &[String], open: &str, close: &str) -> Self {
        let mut escaped: Vec<&String> = terms.iter().filter(|term| !term.is_empty()).collect();
        // Longest first so an alternation never stops at a shorter overlapping term
        escaped.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        let pattern = escaped.iter().map(|term| regex::escape(term)).collect::<Vec<_>>().join("|");

        let regex = if pattern.is_empty() {
            None
        } else {
            match RegexBuilder::new(&pattern).case_insensitive(true).build() {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(error = %e, "Failed to build highlight pattern, snippets stay plain");
                    None
                }
            }
        };

        Self { regex, open: open.to_string(), close: close.to_string() }
    }

    pub fn highlight(&self, text: &str) -> String {
        match &self.regex {
            Some(regex) => regex
                .replace_all(text, |caps: &Captures| format!("{}{}{}", self.open, &caps[0], self.close))
                .into_owned(),
            None => text.to_string(),
        }
    }
}

/// Fields scanned for snippets, in order, restricted to `scope`
fn snippet_fields(entry: &ConversationIndexEntry, scope: Scope) -> Vec<String> {
    let user = || entry.user_messages.join(" ");
    let assistant = || entry.assistant_messages.join(" ");
    let tools = || {
        entry
            .tool_calls
            .iter()
            .map(|call| format!("{}: {}", call.name, call.input))
            .collect::<Vec<_>>()
            .join(" ")
    };

    match scope {
        Scope::All => vec![user(), assistant(), tools()],
        Scope::User => vec![user()],
        Scope::Assistant => vec![assistant()],
        Scope::Tools => vec![tools()],
    }
}

/// Up to `config.max_snippets` highlighted windows, at most one per field.
///
/// Within a field, the first query term (in query order) that occurs anywhere in it picks
/// the window; the window is then highlighted for all terms.
pub fn result_snippets(
    entry: &ConversationIndexEntry,
    terms: &[String],
    scope: Scope,
    highlighter: &Highlighter,
    config: &SearchConfig,
) -> Vec<String> {
    let needles: Vec<Vec<char>> = terms.iter().map(|term| folded_chars(term)).collect();
    let mut snippets = Vec::new();

    for field in snippet_fields(entry, scope) {
        if snippets.len() >= config.max_snippets {
            break;
        }
        if field.is_empty() {
            continue;
        }

        let lowered = folded_chars(&field);
        let Some(position) = needles.iter().find_map(|needle| find_from(&lowered, needle, 0))
        else {
            continue;
        };

        let original: Vec<char> = field.chars().collect();
        let window = extract_context_chars(&original, position, config.snippet_context);
        snippets.push(highlighter.highlight(&window));
    }

    snippets
}
