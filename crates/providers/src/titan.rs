//! Request and response bodies for the Amazon Titan embedding models.
//!
//! Kept free of the AWS SDK so the wire format can be tested without it.

use base64::Engine;
use serde::Deserialize;
use stratus_core::embedding::EmbeddingInput;
use stratus_core::error::ProviderError;

/// Which Titan model family a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitanModel {
    Text,
    Multimodal,
}

/// Build the `InvokeModel` body for an input.
///
/// Text goes to the text model as `{"inputText"}`. Multimodal requests carry
/// `embeddingConfig.outputEmbeddingLength` so image and text vectors share a
/// dimension.
pub fn request_body(input: &EmbeddingInput, dimension: usize) -> (TitanModel, serde_json::Value) {
    match input {
        EmbeddingInput::Text(text) => (TitanModel::Text, serde_json::json!({ "inputText": text })),
        EmbeddingInput::MultimodalText(text) => (
            TitanModel::Multimodal,
            serde_json::json!({
                "inputText": text,
                "embeddingConfig": { "outputEmbeddingLength": dimension },
            }),
        ),
        EmbeddingInput::Image(bytes) => (
            TitanModel::Multimodal,
            serde_json::json!({
                "inputImage": base64::engine::general_purpose::STANDARD.encode(bytes),
                "embeddingConfig": { "outputEmbeddingLength": dimension },
            }),
        ),
    }
}

#[derive(Deserialize)]
struct TitanResponse {
    embedding: Vec<f32>,
}

/// Pull the vector out of a Titan response body.
pub fn parse_response(body: &[u8], dimension: usize) -> Result<Vec<f32>, ProviderError> {
    let parsed: TitanResponse = serde_json::from_slice(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("Titan embedding body: {e}")))?;
    if parsed.embedding.len() != dimension {
        return Err(ProviderError::InvalidResponse(format!(
            "expected {dimension}-dimensional embedding, got {}",
            parsed.embedding.len()
        )));
    }
    Ok(parsed.embedding)
}
