//! Fakes shared by the tool tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use stratus_core::embedding::{Embedder, EmbeddingInput};
use stratus_core::error::{ProviderError, ToolError};
use stratus_core::executor::CodeInterpreter;
use stratus_core::message::Message;
use stratus_core::provider::{Provider, ProviderRequest, ProviderResponse};

/// Embeds everything to the same vector.
pub struct FixedEmbedder(pub Vec<f32>);

#[async_trait]
impl Embedder for FixedEmbedder {
    fn name(&self) -> &str {
        "fixed"
    }

    fn dimension(&self) -> usize {
        self.0.len()
    }

    async fn embed(&self, _input: EmbeddingInput) -> Result<Vec<f32>, ProviderError> {
        Ok(self.0.clone())
    }
}

/// Answers every request with one reply and remembers the last prompt.
pub struct RecordingProvider {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl RecordingProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl Provider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt);
        match &self.reply {
            Some(reply) => Ok(ProviderResponse {
                message: Message::assistant(reply.as_str()),
                usage: None,
                model: request.model,
            }),
            None => Err(ProviderError::Network("connection refused".into())),
        }
    }
}

/// Interpreter that echoes the source back, or fails with a fixed message.
pub struct EchoInterpreter {
    pub fail_with: Option<String>,
    pub sources: Mutex<Vec<String>>,
}

impl EchoInterpreter {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            sources: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(reason: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(reason.to_string()),
            sources: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl CodeInterpreter for EchoInterpreter {
    async fn run(&self, source: &str) -> Result<String, ToolError> {
        self.sources.lock().unwrap().push(source.to_string());
        match &self.fail_with {
            Some(reason) => Err(ToolError::ExecutionFailed {
                tool_name: "python".into(),
                reason: reason.clone(),
            }),
            None => Ok(format!("ran {} bytes", source.len())),
        }
    }
}
