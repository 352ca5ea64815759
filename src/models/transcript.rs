use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::parsers::deserializers::{
    deserialize_blocks, deserialize_lenient, deserialize_message_content, deserialize_timestamp,
};

/// One request/response exchange with the model API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptPair {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub request: TranscriptRequest,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub response: TranscriptResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptRequest {
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub messages: Vec<RequestMessage>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub system: Option<SystemPrompt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestMessage {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub role: String,
    #[serde(default, deserialize_with = "deserialize_message_content")]
    pub content: MessageContent,
}

/// Request message body: either a bare string or a list of content blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl Default for MessageContent {
    fn default() -> Self {
        MessageContent::Text(String::new())
    }
}

impl MessageContent {
    /// Flatten to searchable text, keeping only `text` blocks.
    pub fn flatten(&self) -> String {
        match self {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(ContentBlock::as_text)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

/// The `system` field accepts a plain string or an array of text blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    Text(String),
    Blocks(Vec<SystemBlock>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemBlock {
    #[serde(default)]
    pub text: Option<String>,
}

impl SystemPrompt {
    pub fn flatten(&self) -> String {
        match self {
            SystemPrompt::Text(text) => text.clone(),
            SystemPrompt::Blocks(blocks) => blocks
                .iter()
                .filter_map(|b| b.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub model: Option<String>,
    #[serde(default, deserialize_with = "deserialize_blocks")]
    pub content: Vec<ContentBlock>,
    /// Raw error payload; any non-null value marks the exchange as failed.
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub usage: Option<Usage>,
}

impl TranscriptResponse {
    /// Human-readable error message, if the response carries an error payload.
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_ref().filter(|e| !e.is_null())?;
        let message = match error {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(_) => error
                .get("message")
                .or_else(|| error.get("error").and_then(|inner| inner.get("message")))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            _ => None,
        };
        Some(message.unwrap_or_else(|| UNKNOWN_ERROR.to_string()))
    }
}

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Token accounting reported by the API for one response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub input_tokens: u64,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub output_tokens: u64,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub cache_read_input_tokens: u64,
}

/// Closed set of content block kinds. Unknown kinds are dropped while deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        #[serde(default)]
        text: String,
    },
    Thinking {
        #[serde(default)]
        thinking: String,
    },
    ToolUse {
        #[serde(default)]
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        #[serde(default)]
        content: Value,
    },
}

impl ContentBlock {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Thinking { .. }
            | ContentBlock::ToolUse { .. }
            | ContentBlock::ToolResult { .. } => None,
        }
    }
}

/// One unparsed conversation handed to the index assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConversation {
    pub id: String,
    pub log_file: String,
    #[serde(default)]
    pub html_file: Option<String>,
    /// Expected to be an array of transcript pairs.
    pub payload: Value,
}

/// Externally supplied title and summary for a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
}
