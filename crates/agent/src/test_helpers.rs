//! Shared test helpers for the agent tests.

use async_trait::async_trait;
use std::sync::Mutex;
use stratus_core::error::{ProviderError, ToolError};
use stratus_core::message::Message;
use stratus_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use stratus_core::tool::{Lane, Tool, ToolResult};

/// A mock provider that returns a sequence of scripted replies.
///
/// Panics if more calls are made than replies provided.
pub struct SequentialMockProvider {
    replies: Mutex<Vec<Result<String, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn texts(texts: &[&str]) -> Self {
        Self {
            replies: Mutex::new(texts.iter().map(|t| Ok(t.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            replies: Mutex::new(vec![Err(error)]),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<ProviderRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len() - 1
        };
        let replies = self.replies.lock().unwrap();
        let reply = replies.get(call).cloned().unwrap_or_else(|| {
            panic!(
                "SequentialMockProvider: no more responses (call #{call}, have {})",
                replies.len()
            )
        })?;
        Ok(ProviderResponse {
            message: Message::assistant(reply),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        })
    }
}

/// A tool that echoes its input back.
pub struct EchoTool {
    pub name: &'static str,
    pub lane: Lane,
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "Echoes its input"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "string"})
    }

    fn lane(&self) -> Lane {
        self.lane
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::json(serde_json::json!({ "echo": arguments })))
    }
}

/// A tool that always fails.
pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "string"})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "failing".into(),
            reason: "boom".into(),
        })
    }
}

/// A tool that panics.
pub struct PanickingTool;

#[async_trait]
impl Tool for PanickingTool {
    fn name(&self) -> &str {
        "panicking"
    }

    fn description(&self) -> &str {
        "Panics"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "string"})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        panic!("tool blew up")
    }
}
