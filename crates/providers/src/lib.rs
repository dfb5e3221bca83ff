//! Model provider implementations for Stratus.
//!
//! Chat backends implement `stratus_core::Provider`; embedding backends
//! implement `stratus_core::Embedder`. The router builds both from
//! configuration.

#[cfg(feature = "bedrock")]
pub mod bedrock;
pub mod openai_compat;
pub mod router;
pub mod titan;

#[cfg(feature = "bedrock")]
pub use bedrock::{BedrockProvider, TitanEmbedder};
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_embedder, build_from_config};
