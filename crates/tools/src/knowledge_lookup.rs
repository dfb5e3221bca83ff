//! Knowledge lookup — nearest passages from a reference collection.
//!
//! Embeds the query with the text model and returns the top matches as
//! `{"docs": [{id, score, metadata}, ...]}`. An empty collection or no hits
//! is not an error; the model just sees an empty list.

use async_trait::async_trait;
use std::sync::Arc;
use stratus_core::embedding::{Embedder, EmbeddingInput};
use stratus_core::error::{StoreError, ToolError};
use stratus_core::store::{DocumentStore, VectorMatch, VectorQuery};
use stratus_core::tool::{Lane, Tool, ToolResult, text_argument};
use tracing::debug;

/// Nearest passages for a query, treating a collection that was never
/// seeded as empty.
pub(crate) async fn nearest_passages(
    store: &dyn DocumentStore,
    query: VectorQuery,
) -> Result<Vec<VectorMatch>, StoreError> {
    match store.query(query).await {
        Err(StoreError::UnknownCollection(collection)) => {
            debug!(collection = %collection, "Collection not seeded yet, no passages");
            Ok(Vec::new())
        }
        other => other,
    }
}

pub struct KnowledgeLookupTool {
    name: String,
    description: String,
    collection: String,
    top_k: usize,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
}

impl KnowledgeLookupTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        collection: impl Into<String>,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            collection: collection.into(),
            top_k: 5,
            embedder,
            store,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    fn failure(&self, reason: impl std::fmt::Display) -> ToolError {
        ToolError::ExecutionFailed {
            tool_name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Tool for KnowledgeLookupTool {
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
                "query": {
                    "type": "string",
                    "description": "What to look up in the reference documents"
                }
            },
            "required": ["query"]
        })
    }

    fn lane(&self) -> Lane {
        Lane::DocumentLookup
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<ToolResult, ToolError> {
        let query = text_argument(&arguments, "query")?;

        let vector = self
            .embedder
            .embed(EmbeddingInput::Text(query.clone()))
            .await
            .map_err(|e| self.failure(e))?;

        let query = VectorQuery::new(&self.collection, vector, self.top_k);
        let matches = nearest_passages(self.store.as_ref(), query)
            .await
            .map_err(|e| self.failure(e))?;

        debug!(
            tool = %self.name,
            collection = %self.collection,
            hits = matches.len(),
            "Lookup complete"
        );

        let docs = serde_json::to_value(&matches).map_err(|e| self.failure(e))?;
        Ok(ToolResult::json(serde_json::json!({ "docs": docs })))
    }
}
