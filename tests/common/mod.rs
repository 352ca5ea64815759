//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::Path;

use serde_json::{Value, json};
use tempfile::TempDir;
use transcript_search::models::RawConversation;

/// Builder for creating test transcript directories
pub struct TraceDirBuilder {
    temp_dir: TempDir,
}

impl TraceDirBuilder {
    /// Create a new builder with an empty directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self { temp_dir }
    }

    /// Get the path to the transcript directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Add a JSONL log with the given raw content
    pub fn with_raw_log(self, filename: &str, content: &str) -> Self {
        let log_path = self.temp_dir.path().join(filename);
        let mut file = fs::File::create(log_path).expect("Failed to create log file");
        file.write_all(content.as_bytes()).expect("Failed to write log file");
        self
    }

    /// Add a JSONL log with one line per pair
    pub fn with_log(self, filename: &str, pairs: &[PairBuilder]) -> Self {
        let content = pairs.iter().map(|p| p.to_json_line()).collect::<Vec<_>>().join("\n");
        self.with_raw_log(filename, &content)
    }

    /// Add a rendered HTML document next to a log
    pub fn with_html(self, filename: &str) -> Self {
        fs::write(self.temp_dir.path().join(filename), "<html></html>")
            .expect("Failed to write html file");
        self
    }

    /// Build and return the temp directory (consumes self)
    pub fn build(self) -> TempDir {
        self.temp_dir
    }
}

impl Default for TraceDirBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one request/response transcript pair
#[derive(Clone)]
pub struct PairBuilder {
    user_content: Option<Value>,
    system: Option<Value>,
    model: Option<String>,
    request_timestamp: Option<Value>,
    response_timestamp: Option<Value>,
    response_blocks: Vec<Value>,
    error: Option<Value>,
    usage: Option<Value>,
}

impl PairBuilder {
    /// Create a pair with a plain-text user message and no response content
    pub fn new() -> Self {
        Self {
            user_content: Some(json!("Test message")),
            system: None,
            model: None,
            request_timestamp: Some(json!("2024-01-01T10:00:00.000Z")),
            response_timestamp: Some(json!("2024-01-01T10:00:05.000Z")),
            response_blocks: Vec::new(),
            error: None,
            usage: None,
        }
    }

    /// Set the user message text
    pub fn user(mut self, text: &str) -> Self {
        self.user_content = Some(json!(text));
        self
    }

    /// Set the user message as raw content blocks
    pub fn user_blocks(mut self, blocks: Value) -> Self {
        self.user_content = Some(blocks);
        self
    }

    /// Send no user message at all
    pub fn no_user(mut self) -> Self {
        self.user_content = None;
        self
    }

    pub fn system(mut self, system: &str) -> Self {
        self.system = Some(json!(system));
        self
    }

    pub fn model(mut self, model: &str) -> Self {
        self.model = Some(model.to_string());
        self
    }

    /// Set both timestamps (any JSON shape the parser accepts)
    pub fn timestamps(mut self, request: Value, response: Value) -> Self {
        self.request_timestamp = Some(request);
        self.response_timestamp = Some(response);
        self
    }

    /// Add an assistant text block
    pub fn assistant(mut self, text: &str) -> Self {
        self.response_blocks.push(json!({"type": "text", "text": text}));
        self
    }

    /// Add a thinking block (never indexed)
    pub fn thinking(mut self, text: &str) -> Self {
        self.response_blocks.push(json!({"type": "thinking", "thinking": text}));
        self
    }

    /// Add a tool_use block
    pub fn tool_use(mut self, name: &str, input: Value) -> Self {
        self.response_blocks
            .push(json!({"type": "tool_use", "id": "toolu_1", "name": name, "input": input}));
        self
    }

    /// Add a raw response block
    pub fn block(mut self, block: Value) -> Self {
        self.response_blocks.push(block);
        self
    }

    pub fn error(mut self, error: Value) -> Self {
        self.error = Some(error);
        self
    }

    pub fn usage(mut self, input: u64, output: u64, cached: u64) -> Self {
        self.usage = Some(json!({
            "input_tokens": input,
            "output_tokens": output,
            "cache_read_input_tokens": cached
        }));
        self
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Value {
        let mut request = json!({"messages": []});
        if let Some(content) = &self.user_content {
            request["messages"] = json!([{"role": "user", "content": content}]);
        }
        if let Some(system) = &self.system {
            request["system"] = system.clone();
        }
        if let Some(model) = &self.model {
            request["model"] = json!(model);
        }
        if let Some(ts) = &self.request_timestamp {
            request["timestamp"] = ts.clone();
        }

        let mut response = json!({"content": self.response_blocks});
        if let Some(model) = &self.model {
            response["model"] = json!(model);
        }
        if let Some(ts) = &self.response_timestamp {
            response["timestamp"] = ts.clone();
        }
        if let Some(error) = &self.error {
            response["error"] = error.clone();
        }
        if let Some(usage) = &self.usage {
            response["usage"] = usage.clone();
        }

        json!({"request": request, "response": response})
    }

    /// Convert to a single JSONL line
    pub fn to_json_line(&self) -> String {
        self.to_value().to_string()
    }
}

impl Default for PairBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an in-memory conversation record from pairs
pub fn conversation(id: &str, pairs: &[PairBuilder]) -> RawConversation {
    RawConversation {
        id: id.to_string(),
        log_file: format!("{}.jsonl", id),
        html_file: None,
        payload: Value::Array(pairs.iter().map(|p| p.to_value()).collect()),
    }
}

/// Build a realistic corpus with varied models, tools and timestamps
pub fn realistic_corpus() -> Vec<RawConversation> {
    vec![
        conversation(
            "conv-auth",
            &[
                PairBuilder::new()
                    .model("claude-sonnet")
                    .system("You are a coding assistant")
                    .user("Implement authentication for the REST API")
                    .assistant("I'll add token-based authentication middleware.")
                    .tool_use("Edit", json!({"file_path": "/src/auth.rs", "new": "fn verify()"}))
                    .usage(120, 80, 10),
                PairBuilder::new()
                    .model("claude-sonnet")
                    .timestamps(
                        json!("2024-01-01T10:05:00.000Z"),
                        json!("2024-01-01T10:05:09.000Z"),
                    )
                    .user("Now add tests for the login endpoint")
                    .assistant("Added integration tests for login.")
                    .usage(200, 150, 0),
            ],
        ),
        conversation(
            "conv-css",
            &[PairBuilder::new()
                .model("claude-haiku")
                .timestamps(json!("2024-02-10T08:00:00.000Z"), json!("2024-02-10T08:00:03.000Z"))
                .user("Change the button colors on the settings page")
                .assistant("Updated the stylesheet.")
                .tool_use("Read", json!({"path": "/web/settings.css"}))
                .usage(50, 20, 0)],
        ),
        conversation(
            "conv-deploy",
            &[PairBuilder::new()
                .model("claude-opus")
                .timestamps(json!("2023-12-24T18:30:00.000Z"), json!("2023-12-24T18:31:00.000Z"))
                .user("Why does the deployment pipeline fail on staging?")
                .thinking("Probably the cache")
                .assistant("The deployment fails because the Docker cache is stale.")
                .tool_use("Bash", json!({"command": "docker build --no-cache ."}))
                .error(json!({"type": "error", "error": {"message": "Overloaded"}}))
                .usage(300, 0, 100)],
        ),
    ]
}
