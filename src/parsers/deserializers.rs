use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::models::{ContentBlock, MessageContent};

/// Deserialize any field, falling back to its default when the value has the wrong shape.
///
/// Transcript producers are not strict about field types, so a malformed field must not
/// take the whole pair down with it.
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Timestamp accepting epoch milliseconds or RFC3339 strings, normalized to the fixed-width
/// `YYYY-MM-DDTHH:MM:SS.mmmZ` form. Unparseable values become `None`.
pub fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(normalize_timestamp(&value))
}

pub fn normalize_timestamp(value: &Value) -> Option<String> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        Value::String(s) => s
            .parse::<DateTime<Utc>>()
            .ok()
            .or_else(|| s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis)),
        _ => None,
    };
    parsed.map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Content block list that skips blocks of unknown or malformed kind instead of failing.
pub fn deserialize_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(blocks_from_value(value))
}

/// Message content that is either a string or a content block list.
pub fn deserialize_message_content<'de, D>(deserializer: D) -> Result<MessageContent, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => MessageContent::Text(text),
        array @ Value::Array(_) => MessageContent::Blocks(blocks_from_value(array)),
        _ => MessageContent::default(),
    })
}

fn blocks_from_value(value: Value) -> Vec<ContentBlock> {
    let Value::Array(items) = value else {
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ContentBlock>(item) {
            Ok(block) => Some(block),
            Err(e) => {
                debug!(error = %e, "Skipping unsupported content block");
                None
            }
        })
        .collect()
}
