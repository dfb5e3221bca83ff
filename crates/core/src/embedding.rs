//! Embedder trait — turns text or images into vectors.

use async_trait::async_trait;
use crate::error::ProviderError;

/// What to embed.
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingInput {
    /// Text embedded with the text model (document passages, queries).
    Text(String),
    /// Text embedded into the multimodal space, so it can be compared
    /// against image vectors.
    MultimodalText(String),
    /// Raw image bytes (JPEG/PNG), embedded with the multimodal model.
    Image(Vec<u8>),
}

impl EmbeddingInput {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::MultimodalText(_) => "multimodal_text",
            Self::Image(_) => "image",
        }
    }
}

#[async_trait]
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    /// Length of the vectors this embedder produces.
    fn dimension(&self) -> usize;

    async fn embed(&self, input: EmbeddingInput) -> std::result::Result<Vec<f32>, ProviderError>;
}
