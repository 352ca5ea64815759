//! Pulls searchable content out of one conversation's transcript pairs.
//!
//! Extraction never fails: missing or malformed pieces simply contribute nothing.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::models::{ContentBlock, ToolCall, TranscriptPair};

const ROLE_USER: &str = "user";

/// Tool input fields that name a file
const FILE_FIELDS: &[&str] = &["file_path", "path", "filepath", "file"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub user_messages: Vec<String>,
    pub assistant_messages: Vec<String>,
    pub tool_calls: Vec<ToolCall>,
    pub file_paths: BTreeSet<String>,
    pub errors: Vec<String>,
    pub system_prompt: String,
}

impl ExtractedContent {
    /// Concatenation that gets tokenized: system prompt, user messages, assistant
    /// messages, then `name: input` tool pairs, skipping empties.
    pub fn searchable_text(&self) -> String {
        let tool_pairs = self.tool_calls.iter().map(|call| format!("{}: {}", call.name, call.input));

        std::iter::once(self.system_prompt.clone())
            .chain(self.user_messages.iter().cloned())
            .chain(self.assistant_messages.iter().cloned())
            .chain(tool_pairs)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub fn extract_content(pairs: &[TranscriptPair], max_scan_depth: usize) -> ExtractedContent {
    let mut content = ExtractedContent::default();

    for pair in pairs {
        for message in pair.request.messages.iter().filter(|m| m.role == ROLE_USER) {
            content.user_messages.push(message.content.flatten());
        }

        if content.system_prompt.is_empty()
            && let Some(system) = &pair.request.system
        {
            content.system_prompt = system.flatten();
        }

        for block in &pair.response.content {
            match block {
                ContentBlock::Text { text } => content.assistant_messages.push(text.clone()),
                ContentBlock::ToolUse { name, input } => {
                    content.tool_calls.push(ToolCall {
                        name: name.clone(),
                        input: serialize_tool_input(input),
                    });
                    collect_file_paths(input, 0, max_scan_depth, &mut content.file_paths);
                }
                ContentBlock::Thinking { .. } | ContentBlock::ToolResult { .. } => {}
            }
        }

        if let Some(message) = pair.response.error_message() {
            content.errors.push(message);
        }
    }

    content
}

/// Compact JSON of a tool input; an absent (null) input contributes no text.
fn serialize_tool_input(input: &Value) -> String {
    if input.is_null() {
        return String::new();
    }
    serde_json::to_string(input).unwrap_or_default()
}

/// Depth-capped scan of a tool input for file-reference fields.
///
/// Only object values are descended into; arrays are not walked.
fn collect_file_paths(value: &Value, depth: usize, max_depth: usize, paths: &mut BTreeSet<String>) {
    if depth >= max_depth {
        return;
    }
    let Value::Object(map) = value else {
        return;
    };

    for (key, field) in map {
        if FILE_FIELDS.contains(&key.as_str()) {
            if let Some(path) = field.as_str().filter(|p| !p.is_empty()) {
                paths.insert(path.to_string());
            }
        } else if field.is_object() {
            collect_file_paths(field, depth + 1, max_depth, paths);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::DEFAULT_MAX_SCAN_DEPTH;

    fn pairs(value: Value) -> Vec<TranscriptPair> {
        serde_json::from_value(value).expect("valid pairs")
    }

    #[test]
    fn test_extract_user_and_assistant_messages() {
        let pairs = pairs(json!([
            {
                "request": {
                    "messages": [
                        {"role": "user", "content": "First question"},
                        {"role": "assistant", "content": "not collected from the request"},
                        {"role": "user", "content": [
                            {"type": "text", "text": "Part one"},
                            {"type": "image", "source": {}},
                            {"type": "text", "text": "Part two"}
                        ]}
                    ]
                },
                "response": {
                    "content": [
                        {"type": "thinking", "thinking": "hmm"},
                        {"type": "text", "text": "An answer"}
                    ]
                }
            }
        ]));

        let content = extract_content(&pairs, DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(content.user_messages, vec!["First question", "Part one\n\nPart two"]);
        assert_eq!(content.assistant_messages, vec!["An answer"]);
        assert!(content.tool_calls.is_empty());
        assert!(content.errors.is_empty());
    }

    #[test]
    fn test_first_non_empty_system_prompt_wins() {
        let pairs = pairs(json!([
            {"request": {"system": ""}},
            {"request": {"system": [{"type": "text", "text": "You are helpful"}]}},
            {"request": {"system": "Ignored later prompt"}}
        ]));

        let content = extract_content(&pairs, DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(content.system_prompt, "You are helpful");
    }

    #[test]
    fn test_tool_use_summaries_and_file_paths() {
        let pairs = pairs(json!([
            {
                "response": {
                    "content": [
                        {"type": "tool_use", "id": "t1", "name": "Read", "input": {"file_path": "/src/lib.rs"}},
                        {"type": "tool_use", "id": "t2", "name": "Edit", "input": {
                            "options": {"nested": {"path": "/src/main.rs"}},
                            "files": [{"file": "/ignored/in/array.rs"}]
                        }},
                        {"type": "tool_use", "id": "t3", "name": "Read", "input": {"file_path": "/src/lib.rs"}}
                    ]
                }
            }
        ]));

        let content = extract_content(&pairs, DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(content.tool_calls.len(), 3);
        assert_eq!(content.tool_calls[0].name, "Read");
        assert_eq!(content.tool_calls[0].input, r#"{"file_path":"/src/lib.rs"}"#);
        assert_eq!(
            content.file_paths.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["/src/lib.rs", "/src/main.rs"]
        );
    }

    #[test]
    fn test_tool_use_without_input() {
        let pairs = pairs(json!([
            {"response": {"content": [{"type": "tool_use", "id": "t1", "name": "Ping"}]}}
        ]));

        let content = extract_content(&pairs, DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(content.tool_calls[0].name, "Ping");
        assert_eq!(content.tool_calls[0].input, "");
        assert_eq!(content.searchable_text(), "Ping: ");
        assert_eq!(crate::indexer::tokenize(&content.searchable_text()), vec!["ping"]);
    }

    #[test]
    fn test_file_path_scan_is_depth_capped() {
        let mut input = json!({"file_path": "/deep.rs"});
        for _ in 0..100 {
            input = json!({"wrapper": input});
        }
        let pairs = vec![TranscriptPair {
            response: crate::models::TranscriptResponse {
                content: vec![ContentBlock::ToolUse { name: "Deep".to_string(), input }],
                ..Default::default()
            },
            ..Default::default()
        }];

        let content = extract_content(&pairs, 8);
        assert!(content.file_paths.is_empty());
        assert_eq!(content.tool_calls.len(), 1);
    }

    #[test]
    fn test_error_messages() {
        let pairs = pairs(json!([
            {"response": {"error": {"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}}},
            {"response": {"error": {"message": "Rate limited"}}},
            {"response": {"error": {"code": 500}}},
            {"response": {"error": null}}
        ]));

        let content = extract_content(&pairs, DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(content.errors, vec!["Overloaded", "Rate limited", "Unknown error"]);
    }

    #[test]
    fn test_searchable_text_order_and_empties() {
        let content = ExtractedContent {
            user_messages: vec!["question".to_string(), String::new()],
            assistant_messages: vec!["answer".to_string()],
            tool_calls: vec![ToolCall { name: "Bash".to_string(), input: r#"{"cmd":"ls"}"#.to_string() }],
            system_prompt: String::new(),
            ..Default::default()
        };

        assert_eq!(content.searchable_text(), "question\n\nanswer\n\nBash: {\"cmd\":\"ls\"}");
    }

    #[test]
    fn test_empty_pairs() {
        let content = extract_content(&[], DEFAULT_MAX_SCAN_DEPTH);
        assert_eq!(content, ExtractedContent::default());
        assert_eq!(content.searchable_text(), "");
    }
}
