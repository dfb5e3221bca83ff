//! Retrieval-QA tools: look up passages, then have the model answer from them.
//!
//! Three tools share this shape and differ only in collection, prompt and
//! output field:
//!
//! | Tool | Collection | Output |
//! |---|---|---|
//! | `well_arch_tool` (rag mode) | Well-Architected Framework | `answer` |
//! | `web_service_search_tool` | AWS services overview | `answer` |
//! | `aws_cloud_diagram_code_tool` | `diagrams` manual | `code` |

use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::embedding::{Embedder, EmbeddingInput};
use stratus_core::error::ToolError;
use stratus_core::message::Message;
use stratus_core::provider::{Provider, ProviderRequest};
use stratus_core::store::{DocumentStore, VectorQuery};
use stratus_core::tool::{Lane, Tool, ToolResult, text_argument};
use tracing::debug;

use crate::knowledge_lookup::nearest_passages;
use crate::prompts;
use crate::python_interpreter::strip_code_fences;

pub const WEB_SERVICE_SEARCH: &str = "web_service_search_tool";
pub const DIAGRAM_CODE: &str = "aws_cloud_diagram_code_tool";

/// The model and index every retrieval-QA tool talks to.
#[derive(Clone)]
pub struct QaBackend {
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn DocumentStore>,
    pub provider: Arc<dyn Provider>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub top_k: usize,
}

pub struct RetrievalQaTool {
    name: String,
    description: String,
    lane: Lane,
    collection: String,
    template: &'static str,
    output_key: &'static str,
    backend: QaBackend,
}

impl RetrievalQaTool {
    pub fn well_architected(backend: QaBackend, collection: impl Into<String>) -> Self {
        Self {
            name: crate::WELL_ARCH.into(),
            description: crate::WELL_ARCH_DESCRIPTION.into(),
            lane: Lane::DocumentLookup,
            collection: collection.into(),
            template: prompts::WELL_ARCHITECTED,
            output_key: "answer",
            backend,
        }
    }

    pub fn web_services(backend: QaBackend, collection: impl Into<String>) -> Self {
        Self {
            name: WEB_SERVICE_SEARCH.into(),
            description: "Finds AWS services that fit a workload, using the AWS services overview \
                          whitepaper. Input is a description of what needs to be built."
                .into(),
            lane: Lane::DocumentLookup,
            collection: collection.into(),
            template: prompts::WEB_SERVICES,
            output_key: "answer",
            backend,
        }
    }

    pub fn diagram_code(backend: QaBackend, collection: impl Into<String>) -> Self {
        Self {
            name: DIAGRAM_CODE.into(),
            description: "Writes Python code that draws an AWS architecture diagram with the \
                          `diagrams` library, saved as tmp.png. Input is the architecture to draw. \
                          Run the returned code with python_interpreter_tool."
                .into(),
            lane: Lane::CodeGeneration,
            collection: collection.into(),
            template: prompts::DIAGRAM_CODE,
            output_key: "code",
            backend,
        }
    }

    fn failure(&self, reason: impl std::fmt::Display) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Tool for RetrievalQaTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The question or request" }
            },
            "required": ["query"]
        })
    }

    fn lane(&self) -> Lane {
        self.lane
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let question = text_argument(&arguments, "query")?;
        let backend = &self.backend;

        let vector = backend
            .embedder
            .embed(EmbeddingInput::Text(question.clone()))
            .await
            .map_err(|e| self.failure(e))?;
        let query = VectorQuery::new(&self.collection, vector, backend.top_k);
        let matches = nearest_passages(backend.store.as_ref(), query)
            .await
            .map_err(|e| self.failure(e))?;

        let context = matches
            .iter()
            .filter_map(|m| m.text())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sources: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();

        debug!(tool = %self.name, passages = matches.len(), "Generating from retrieved passages");

        let request = ProviderRequest::new(
            &backend.model,
            vec![Message::user(prompts::render(self.template, &question, &context))],
        )
        .with_temperature(backend.temperature)
        .with_max_tokens(backend.max_tokens);

        let response = backend
            .provider
            .complete(request)
            .await
            .map_err(|e| self.failure(e))?;

        let text = match self.lane {
            Lane::CodeGeneration => strip_code_fences(&response.message.content),
            _ => response.message.content.trim().to_string(),
        };

        Ok(ToolResult::json(serde_json::json!({
            (self.output_key): text,
            "sources": sources,
        })))
    }
}
