use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use super::ast::{Scope, SearchFilters, TimeRange};
use crate::models::ConversationIndexEntry;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Apply filters to index entries, returning the survivors in input order
///
/// Filter logic:
/// - Scope: the raw query, compared case-insensitively, must occur in the scoped text
/// - Models: any overlap with the requested set (empty set passes everything)
/// - Time: conversation started strictly less than the window's days before `now`
///
/// The three dimensions combine with AND.
pub fn apply_filters<'a>(
    entries: &'a [ConversationIndexEntry],
    filters: &SearchFilters,
    raw_query: &str,
    now: DateTime<Utc>,
) -> Vec<&'a ConversationIndexEntry> {
    entries.iter().filter(|entry| passes_filters(entry, filters, raw_query, now)).collect()
}

/// Evaluate every filter dimension against a single entry
pub fn passes_filters(
    entry: &ConversationIndexEntry,
    filters: &SearchFilters,
    raw_query: &str,
    now: DateTime<Utc>,
) -> bool {
    match_scope(entry, filters.scope, raw_query)
        && match_models(entry, &filters.models)
        && match_time(entry, filters.time_range, now)
}

/// Text a scope restricts matching to, or `None` for [`Scope::All`]
pub fn scope_text(entry: &ConversationIndexEntry, scope: Scope) -> Option<String> {
    match scope {
        Scope::All => None,
        Scope::User => Some(entry.user_messages.join(" ")),
        Scope::Assistant => Some(entry.assistant_messages.join(" ")),
        Scope::Tools => {
            Some(entry.tool_calls.iter().map(|call| call.name.as_str()).collect::<Vec<_>>().join(" "))
        }
    }
}

/// Case-insensitive substring match of the whole raw query within the scoped text
fn match_scope(entry: &ConversationIndexEntry, scope: Scope, raw_query: &str) -> bool {
    let Some(text) = scope_text(entry, scope) else {
        return true;
    };
    text.to_lowercase().contains(&raw_query.to_lowercase())
}

fn match_models(entry: &ConversationIndexEntry, models: &BTreeSet<String>) -> bool {
    models.is_empty() || !entry.models.is_disjoint(models)
}

/// Entries whose start time cannot be read never pass an active window
fn match_time(entry: &ConversationIndexEntry, range: TimeRange, now: DateTime<Utc>) -> bool {
    let Some(max_days) = range.max_age_days() else {
        return true;
    };

    match DateTime::parse_from_rfc3339(&entry.start_time) {
        Ok(start) => {
            let elapsed_ms = (now - start.with_timezone(&Utc)).num_milliseconds() as f64;
            elapsed_ms / MILLIS_PER_DAY < max_days
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::models::{TokenUsage, ToolCall};

    fn create_test_entry(start: DateTime<Utc>, models: &[&str]) -> ConversationIndexEntry {
        let start_time = start.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        ConversationIndexEntry {
            id: "c1".to_string(),
            log_file: "log.jsonl".to_string(),
            html_file: None,
            title: "Test".to_string(),
            summary: None,
            start_time: start_time.clone(),
            end_time: start_time,
            message_count: 1,
            models: models.iter().map(|m| m.to_string()).collect(),
            total_tokens: TokenUsage::default(),
            searchable_text: String::new(),
            user_messages: vec!["Please fix the Login flow".to_string()],
            assistant_messages: vec!["Looking at the auth module".to_string()],
            tool_calls: vec![ToolCall {
                name: "Grep".to_string(),
                input: "{\"pattern\":\"login\"}".to_string(),
            }],
            file_paths: BTreeSet::new(),
            errors: Vec::new(),
            system_prompt: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_apply_filters_empty() {
        let entries = vec![create_test_entry(now(), &["m1"])];
        let result = apply_filters(&entries, &SearchFilters::default(), "anything", now());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_match_scope_user() {
        let entry = create_test_entry(now(), &[]);
        assert!(match_scope(&entry, Scope::User, "login FLOW"));
        // Surrounding whitespace is part of the query
        assert!(!match_scope(&entry, Scope::User, "  login FLOW "));
        assert!(!match_scope(&entry, Scope::User, "auth module"));
        assert!(match_scope(&entry, Scope::Assistant, "auth module"));
    }

    #[test]
    fn test_match_scope_tools_uses_names_only() {
        let entry = create_test_entry(now(), &[]);
        assert!(match_scope(&entry, Scope::Tools, "grep"));
        assert!(!match_scope(&entry, Scope::Tools, "pattern"));
    }

    #[test]
    fn test_scope_all_skips_substring_check() {
        let entry = create_test_entry(now(), &[]);
        assert!(match_scope(&entry, Scope::All, "not present anywhere"));
        assert_eq!(scope_text(&entry, Scope::All), None);
    }

    #[test]
    fn test_match_models() {
        let entry = create_test_entry(now(), &["m1", "m2"]);
        assert!(match_models(&entry, &BTreeSet::new()));
        assert!(match_models(&entry, &["m2".to_string(), "m9".to_string()].into()));
        assert!(!match_models(&entry, &["m9".to_string()].into()));
    }

    #[test]
    fn test_match_time_windows() {
        let forty_days_ago = create_test_entry(now() - Duration::days(40), &[]);
        assert!(!match_time(&forty_days_ago, TimeRange::Month, now()));
        assert!(match_time(&forty_days_ago, TimeRange::All, now()));

        let three_days_ago = create_test_entry(now() - Duration::days(3), &[]);
        assert!(match_time(&three_days_ago, TimeRange::Week, now()));
        assert!(!match_time(&three_days_ago, TimeRange::Today, now()));

        let hour_ago = create_test_entry(now() - Duration::hours(1), &[]);
        assert!(match_time(&hour_ago, TimeRange::Today, now()));
    }

    #[test]
    fn test_match_time_boundary_is_exclusive() {
        let exactly_week = create_test_entry(now() - Duration::days(7), &[]);
        assert!(!match_time(&exactly_week, TimeRange::Week, now()));
    }

    #[test]
    fn test_match_time_unparseable_start() {
        let mut entry = create_test_entry(now(), &[]);
        entry.start_time = "not a date".to_string();
        assert!(!match_time(&entry, TimeRange::Month, now()));
        assert!(match_time(&entry, TimeRange::All, now()));
    }

    #[test]
    fn test_filters_combine_with_and() {
        let entries = vec![
            create_test_entry(now() - Duration::days(2), &["m1"]),
            create_test_entry(now() - Duration::days(2), &["m2"]),
            create_test_entry(now() - Duration::days(20), &["m1"]),
        ];
        let filters = SearchFilters::new().with_model("m1").with_time_range(TimeRange::Week);
        let result = apply_filters(&entries, &filters, "login", now());
        assert_eq!(result.len(), 1);
        assert!(result[0].models.contains("m1"));
    }
}
