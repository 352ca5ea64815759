use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which part of a conversation the scope filter matches against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Scope {
    #[default]
    All,
    /// User messages only
    User,
    /// Assistant messages only
    Assistant,
    /// Tool names only
    Tools,
}

impl From<&str> for Scope {
    /// Unrecognized values fall back to [`Scope::All`]
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "user" => Scope::User,
            "assistant" => Scope::Assistant,
            "tools" | "tool" => Scope::Tools,
            _ => Scope::All,
        }
    }
}

impl From<String> for Scope {
    fn from(value: String) -> Self {
        Scope::from(value.as_str())
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scope::All => "all",
            Scope::User => "user",
            Scope::Assistant => "assistant",
            Scope::Tools => "tools",
        };
        f.write_str(name)
    }
}

/// Recency window measured from the conversation's start time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TimeRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl TimeRange {
    /// Conversations must be strictly younger than this many days
    pub fn max_age_days(self) -> Option<f64> {
        match self {
            TimeRange::All => None,
            TimeRange::Today => Some(1.0),
            TimeRange::Week => Some(7.0),
            TimeRange::Month => Some(30.0),
        }
    }
}

impl From<&str> for TimeRange {
    /// Unrecognized values fall back to [`TimeRange::All`]
    fn from(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "today" => TimeRange::Today,
            "week" => TimeRange::Week,
            "month" => TimeRange::Month,
            _ => TimeRange::All,
        }
    }
}

impl From<String> for TimeRange {
    fn from(value: String) -> Self {
        TimeRange::from(value.as_str())
    }
}

/// Post-retrieval filters applied to every search candidate.
///
/// Dimensions combine with AND; an empty model set means no model filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchFilters {
    pub scope: Scope,
    pub time_range: TimeRange,
    pub models: BTreeSet<String>,
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_time_range(mut self, time_range: TimeRange) -> Self {
        self.time_range = time_range;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.models.insert(model.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scope == Scope::All && self.time_range == TimeRange::All && self.models.is_empty()
    }
}
