//! In-memory store — useful for testing and for runs without Postgres.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use stratus_core::error::StoreError;
use stratus_core::store::{DocumentStore, VectorMatch, VectorQuery, VectorRecord};
use tokio::sync::RwLock;

use crate::vector::rank_records;

struct Collection {
    dimension: usize,
    records: Vec<VectorRecord>,
}

/// Collections held in a map of vectors, searched by brute force.
#[derive(Clone)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn ensure_collection(
        &self,
        collection: &str,
        dimension: usize,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        match collections.get(collection) {
            Some(existing) if existing.dimension != dimension => Err(StoreError::DimensionMismatch {
                expected: existing.dimension,
                actual: dimension,
            }),
            Some(_) => Ok(()),
            None => {
                collections.insert(
                    collection.to_string(),
                    Collection {
                        dimension,
                        records: Vec::new(),
                    },
                );
                Ok(())
            }
        }
    }

    async fn upsert(
        &self,
        collection: &str,
        records: Vec<VectorRecord>,
    ) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().await;
        let target = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        if let Some(bad) = records.iter().find(|r| r.vector.len() != target.dimension) {
            return Err(StoreError::DimensionMismatch {
                expected: target.dimension,
                actual: bad.vector.len(),
            });
        }

        let written = records.len();
        for record in records {
            match target.records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => *existing = record,
                None => target.records.push(record),
            }
        }
        Ok(written)
    }

    async fn query(&self, query: VectorQuery) -> Result<Vec<VectorMatch>, StoreError> {
        let collections = self.collections.read().await;
        let target = collections
            .get(&query.collection)
            .ok_or_else(|| StoreError::UnknownCollection(query.collection.clone()))?;

        Ok(rank_records(
            &target.records,
            &query.vector,
            query.limit,
            query.filter.as_ref(),
        ))
    }

    async fn count(&self, collection: &str) -> Result<usize, StoreError> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.records.len())
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))
    }
}
