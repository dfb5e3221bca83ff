//! Vector document store implementations for Stratus.
//!
//! Every backend implements `stratus_core::DocumentStore`. The `ingest`
//! module turns reference documents and images into stored vectors.

pub mod chunk;
pub mod in_memory;
pub mod ingest;
pub mod vector;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use chunk::chunk_text;
pub use in_memory::InMemoryStore;
pub use ingest::{IngestReport, Ingestor};
pub use vector::{cosine_similarity, rank_records};

#[cfg(feature = "postgres")]
pub use postgres::PgVectorStore;
