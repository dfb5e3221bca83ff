//! Ingestion: reference documents and images into vector collections.
//!
//! Documents are split into fixed-size chunks, each chunk embedded with the
//! text model and stored with id `<source>_chunk<i>`. Images are embedded with
//! the multimodal model and stored under their file name.

use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use stratus_core::embedding::{Embedder, EmbeddingInput};
use stratus_core::error::Result;
use stratus_core::store::{DocumentStore, VectorRecord};
use tracing::{debug, info};

use crate::chunk::{DEFAULT_CHUNK_SIZE, chunk_text};

/// What one ingestion run wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub collection: String,
    /// Chunks or images embedded
    pub embedded: usize,
    pub written: usize,
}

pub struct Ingestor {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn DocumentStore>,
    concurrency: usize,
    chunk_size: usize,
}

impl Ingestor {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            embedder,
            store,
            concurrency: 4,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Maximum embedding requests in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Chunk, embed and store a document, then build the collection index.
    ///
    /// Blank chunks are skipped but keep their position in the numbering.
    pub async fn ingest_text(
        &self,
        collection: &str,
        source: &str,
        doc_type: &str,
        text: &str,
    ) -> Result<IngestReport> {
        let chunks: Vec<(usize, String)> = chunk_text(text, self.chunk_size)
            .into_iter()
            .enumerate()
            .filter(|(_, c)| !c.trim().is_empty())
            .collect();

        info!(collection, source, chunks = chunks.len(), "Embedding document");

        let records: Vec<VectorRecord> = futures::stream::iter(chunks)
            .map(|(idx, chunk)| async move {
                let vector = self.embedder.embed(EmbeddingInput::Text(chunk.clone())).await?;
                debug!(source, idx, "Embedded chunk");
                Ok::<_, stratus_core::Error>(VectorRecord {
                    id: format!("{source}_chunk{idx}"),
                    vector,
                    metadata: serde_json::json!({
                        "type": doc_type,
                        "chunk_index": idx,
                        "source": source,
                        "text": chunk,
                    }),
                })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        self.store(collection, records).await
    }

    /// Embed and store images given as `(file name, bytes)`.
    ///
    /// Metadata `type` is the lower-cased file extension.
    pub async fn ingest_images(
        &self,
        collection: &str,
        images: Vec<(String, Vec<u8>)>,
    ) -> Result<IngestReport> {
        info!(collection, images = images.len(), "Embedding images");

        let records: Vec<VectorRecord> = futures::stream::iter(images)
            .map(|(name, bytes)| async move {
                let vector = self.embedder.embed(EmbeddingInput::Image(bytes)).await?;
                let kind = name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_ascii_lowercase())
                    .unwrap_or_default();
                Ok::<_, stratus_core::Error>(VectorRecord {
                    metadata: serde_json::json!({ "type": kind }),
                    id: name,
                    vector,
                })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        self.store(collection, records).await
    }

    async fn store(&self, collection: &str, records: Vec<VectorRecord>) -> Result<IngestReport> {
        let embedded = records.len();
        self.store
            .ensure_collection(collection, self.embedder.dimension())
            .await?;
        let written = self.store.upsert(collection, records).await?;
        self.store.create_index(collection).await?;

        info!(collection, written, "Collection seeded");
        Ok(IngestReport {
            collection: collection.to_string(),
            embedded,
            written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_memory::InMemoryStore;
    use async_trait::async_trait;
    use stratus_core::error::ProviderError;
    use stratus_core::store::VectorQuery;

    /// Embeds text by its length and first byte; images by their size.
    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        fn name(&self) -> &str { "fake" }
        fn dimension(&self) -> usize { 2 }
        async fn embed(
            &self,
            input: EmbeddingInput,
        ) -> std::result::Result<Vec<f32>, ProviderError> {
            match input {
                EmbeddingInput::Text(t) | EmbeddingInput::MultimodalText(t) => {
                    Ok(vec![t.len() as f32, *t.as_bytes().first().unwrap_or(&0) as f32])
                }
                EmbeddingInput::Image(b) => Ok(vec![b.len() as f32, 1.0]),
            }
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        fn name(&self) -> &str { "failing" }
        fn dimension(&self) -> usize { 2 }
        async fn embed(
            &self,
            _input: EmbeddingInput,
        ) -> std::result::Result<Vec<f32>, ProviderError> {
            Err(ProviderError::Timeout("embed".into()))
        }
    }

    #[tokio::test]
    async fn ingests_chunks_with_metadata() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::new(Arc::new(FakeEmbedder), store.clone()).with_chunk_size(10);

        let text = format!("{}{}", "a".repeat(10), "b".repeat(5));
        let report = ingestor
            .ingest_text("docs", "waf", "pdf", &text)
            .await
            .unwrap();
        assert_eq!(report.embedded, 2);
        assert_eq!(report.written, 2);
        assert_eq!(store.count("docs").await.unwrap(), 2);

        let matches = store
            .query(VectorQuery::new("docs", vec![5.0, 98.0], 1))
            .await
            .unwrap();
        assert_eq!(matches[0].id, "waf_chunk1");
        assert_eq!(matches[0].metadata["chunk_index"], 1);
        assert_eq!(matches[0].metadata["type"], "pdf");
        assert_eq!(matches[0].text(), Some("bbbbb"));
    }

    #[tokio::test]
    async fn blank_chunks_are_skipped() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::new(Arc::new(FakeEmbedder), store.clone()).with_chunk_size(4);
        let report = ingestor
            .ingest_text("docs", "notes", "text", "abcd    efgh")
            .await
            .unwrap();
        assert_eq!(report.written, 2);
        let ids: Vec<String> = store
            .query(VectorQuery::new("docs", vec![4.0, 97.0], 5))
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert!(ids.contains(&"notes_chunk0".to_string()));
        assert!(ids.contains(&"notes_chunk2".to_string()));
    }

    #[tokio::test]
    async fn images_are_typed_by_extension() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::new(Arc::new(FakeEmbedder), store.clone());
        ingestor
            .ingest_images(
                "image_vectors",
                vec![("Lambda.JPG".into(), vec![1, 2, 3]), ("s3.png".into(), vec![1])],
            )
            .await
            .unwrap();
        let matches = store
            .query(VectorQuery::new("image_vectors", vec![3.0, 1.0], 5))
            .await
            .unwrap();
        assert_eq!(matches[0].id, "Lambda.JPG");
        assert_eq!(matches[0].metadata["type"], "jpg");
    }

    #[tokio::test]
    async fn embedding_failure_aborts_before_writing() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::new(Arc::new(FailingEmbedder), store.clone());
        let err = ingestor.ingest_text("docs", "waf", "pdf", "text").await.unwrap_err();
        assert!(matches!(err, stratus_core::Error::Provider(ProviderError::Timeout(_))));
        assert!(store.count("docs").await.is_err());
    }
}
