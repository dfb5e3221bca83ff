//! DocumentStore trait — the abstraction over the vector index.
//!
//! Documents live in named collections of fixed-dimension vectors with a
//! JSON metadata payload. Queries are nearest-neighbour by cosine
//! similarity, optionally narrowed by exact metadata matches.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::StoreError;

/// A vector to be written into a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Exact-match conditions on metadata fields (all must hold).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataFilter {
    conditions: serde_json::Map<String, serde_json::Value>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `metadata[field] == value`.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Does a metadata document satisfy every condition?
    pub fn matches(&self, metadata: &serde_json::Value) -> bool {
        self.conditions
            .iter()
            .all(|(field, expected)| metadata.get(field) == Some(expected))
    }

    /// The filter as a JSON object, usable with Postgres `@>` containment.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(self.conditions.clone())
    }
}

/// A nearest-neighbour query.
#[derive(Debug, Clone)]
pub struct VectorQuery {
    pub collection: String,
    pub vector: Vec<f32>,
    /// Maximum number of matches returned
    pub limit: usize,
    pub filter: Option<MetadataFilter>,
}

impl VectorQuery {
    pub fn new(collection: impl Into<String>, vector: Vec<f32>, limit: usize) -> Self {
        Self {
            collection: collection.into(),
            vector,
            limit,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: MetadataFilter) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// One query result. Higher `score` is more similar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: serde_json::Value,
}

impl VectorMatch {
    /// The passage text stored alongside the vector, if any.
    pub fn text(&self) -> Option<&str> {
        self.metadata.get("text").and_then(|t| t.as_str())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The name of this backend (e.g., "postgres", "in_memory").
    fn name(&self) -> &str;

    /// Create the collection if it does not exist yet.
    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
    ) -> std::result::Result<(), StoreError>;

    /// Insert or replace records by id. Returns how many were written.
    async fn upsert(
        &self,
        collection: &str,
        records: Vec<VectorRecord>,
    ) -> std::result::Result<usize, StoreError>;

    /// Nearest neighbours, best first, at most `query.limit`.
    async fn query(&self, query: VectorQuery) -> std::result::Result<Vec<VectorMatch>, StoreError>;

    /// Build the approximate-nearest-neighbour index for a collection.
    async fn create_index(&self, collection: &str) -> std::result::Result<(), StoreError> {
        let _ = collection;
        Ok(())
    }

    async fn count(&self, collection: &str) -> std::result::Result<usize, StoreError>;

    /// Health check — is the backend reachable?
    async fn health_check(&self) -> std::result::Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_matches_all_conditions() {
        let filter = MetadataFilter::new().eq("type", "jpg").eq("chunk_index", 3);
        assert!(filter.matches(&json!({"type": "jpg", "chunk_index": 3, "extra": true})));
        assert!(!filter.matches(&json!({"type": "jpg", "chunk_index": 4})));
        assert!(!filter.matches(&json!({"chunk_index": 3})));
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = MetadataFilter::new();
        assert!(filter.is_empty());
        assert!(filter.matches(&json!({})));
        assert!(filter.matches(&json!(null)));
    }

    #[test]
    fn filter_to_json_is_containment_document() {
        let filter = MetadataFilter::new().eq("type", "jpg");
        assert_eq!(filter.to_json(), json!({"type": "jpg"}));
    }

    #[test]
    fn match_text_reads_metadata() {
        let m = VectorMatch {
            id: "waf_chunk0".into(),
            score: 0.9,
            metadata: json!({"text": "Operational excellence"}),
        };
        assert_eq!(m.text(), Some("Operational excellence"));

        let m = VectorMatch { id: "x".into(), score: 0.1, metadata: json!({"type": "pdf"}) };
        assert!(m.text().is_none());
    }
}
