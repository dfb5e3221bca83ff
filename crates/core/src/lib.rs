//! # Stratus Core
//!
//! Domain types, traits, and error definitions for the Stratus AWS
//! architecture assistant. This crate has **zero framework dependencies**: it
//! defines the model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (chat model, embedding model, vector store,
//! shell, Python interpreter, the agent's decision step) is a trait here.
//! Implementations live in their respective crates and are handed to the
//! reasoning loop through constructors, so tests can swap any of them for a
//! scripted stub.

pub mod action;
pub mod embedding;
pub mod error;
pub mod executor;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use action::{
    Action, ActionSource, Observation, ObservationStatus, ToolInvocation, Transcript,
    TranscriptEntry,
};
pub use embedding::{Embedder, EmbeddingInput};
pub use error::{Error, Result};
pub use executor::{CodeInterpreter, CommandExecutor};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use store::{DocumentStore, MetadataFilter, VectorMatch, VectorQuery, VectorRecord};
pub use tool::{Lane, Tool, ToolRegistry, ToolResult};
