//! Amazon Bedrock provider.
//!
//! Chat goes through the Converse API, which gives every Bedrock chat model
//! the same request shape. Embeddings go through `InvokeModel` against the
//! Titan text and multimodal models (see [`crate::titan`]).

use async_trait::async_trait;
use aws_sdk_bedrockruntime::Client as BedrockClient;
use aws_sdk_bedrockruntime::error::SdkError;
use aws_sdk_bedrockruntime::operation::converse::ConverseError;
use aws_sdk_bedrockruntime::operation::invoke_model::InvokeModelError;
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::types as bedrock;
use std::sync::Arc;
use stratus_core::embedding::{Embedder, EmbeddingInput};
use stratus_core::error::ProviderError;
use stratus_core::message::{Message, Role};
use stratus_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use tracing::debug;

use crate::titan::{self, TitanModel};

/// Load AWS credentials and build a Bedrock Runtime client.
pub async fn connect(region: &str, profile: Option<&str>) -> Arc<BedrockClient> {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(region.to_string()));

    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }

    let sdk_config = loader.load().await;
    Arc::new(BedrockClient::new(&sdk_config))
}

pub struct BedrockProvider {
    client: Arc<BedrockClient>,
    region: String,
}

impl BedrockProvider {
    pub fn new(client: Arc<BedrockClient>, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    fn to_bedrock_messages(messages: &[Message]) -> Result<Vec<bedrock::Message>, ProviderError> {
        messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = match m.role {
                    Role::Assistant => bedrock::ConversationRole::Assistant,
                    _ => bedrock::ConversationRole::User,
                };
                bedrock::Message::builder()
                    .role(role)
                    .content(bedrock::ContentBlock::Text(m.content.clone()))
                    .build()
                    .map_err(|e| {
                        ProviderError::InvalidResponse(format!("Failed to build message: {e}"))
                    })
            })
            .collect()
    }
}

#[async_trait]
impl Provider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let system = request
            .system_prompt()
            .map(|p| vec![bedrock::SystemContentBlock::Text(p)]);
        let messages = Self::to_bedrock_messages(&request.messages)?;

        let mut inference =
            bedrock::InferenceConfiguration::builder().temperature(request.temperature);
        if let Some(max_tokens) = request.max_tokens {
            inference = inference.max_tokens(max_tokens as i32);
        }
        if !request.stop.is_empty() {
            inference = inference.set_stop_sequences(Some(request.stop.clone()));
        }

        debug!(
            model = %request.model,
            region = %self.region,
            messages = messages.len(),
            "Calling Bedrock Converse API"
        );

        let response = self
            .client
            .converse()
            .model_id(&request.model)
            .set_system(system)
            .set_messages(Some(messages))
            .inference_config(inference.build())
            .send()
            .await
            .map_err(|e| converse_error(&e))?;

        let text = match response.output() {
            Some(bedrock::ConverseOutput::Message(message)) => message
                .content()
                .iter()
                .filter_map(|block| match block {
                    bedrock::ContentBlock::Text(text) => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(""),
            _ => {
                return Err(ProviderError::InvalidResponse(
                    "No message in Bedrock response".into(),
                ));
            }
        };

        let usage = response.usage().map(|u| Usage {
            prompt_tokens: u.input_tokens().max(0) as u32,
            completion_tokens: u.output_tokens().max(0) as u32,
            total_tokens: u.total_tokens().max(0) as u32,
        });

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage,
            model: request.model,
        })
    }
}

/// Titan embeddings over `InvokeModel`.
pub struct TitanEmbedder {
    client: Arc<BedrockClient>,
    text_model: String,
    image_model: String,
    dimension: usize,
}

impl TitanEmbedder {
    pub fn new(
        client: Arc<BedrockClient>,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
        dimension: usize,
    ) -> Self {
        Self {
            client,
            text_model: text_model.into(),
            image_model: image_model.into(),
            dimension,
        }
    }
}

#[async_trait]
impl Embedder for TitanEmbedder {
    fn name(&self) -> &str {
        "bedrock-titan"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, input: EmbeddingInput) -> std::result::Result<Vec<f32>, ProviderError> {
        let kind = input.kind();
        let (model, body) = titan::request_body(&input, self.dimension);
        let model_id = match model {
            TitanModel::Text => &self.text_model,
            TitanModel::Multimodal => &self.image_model,
        };
        let payload = serde_json::to_vec(&body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        debug!(model = %model_id, kind, "Calling Bedrock InvokeModel for embedding");

        let response = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|e| invoke_error(&e))?;

        titan::parse_response(response.body().as_ref(), self.dimension)
    }
}

fn converse_error(err: &SdkError<ConverseError>) -> ProviderError {
    match err {
        SdkError::ServiceError(service_err) => match service_err.err() {
            ConverseError::ThrottlingException(e) => ProviderError::RateLimited(e.to_string()),
            ConverseError::AccessDeniedException(e) => {
                ProviderError::AuthenticationFailed(e.to_string())
            }
            ConverseError::ResourceNotFoundException(e) => {
                ProviderError::ModelNotFound(e.to_string())
            }
            ConverseError::ModelNotReadyException(e) => ProviderError::ModelNotFound(e.to_string()),
            ConverseError::ModelTimeoutException(e) => ProviderError::Timeout(e.to_string()),
            ConverseError::ValidationException(e) => ProviderError::ApiError {
                status_code: 400,
                message: e.to_string(),
            },
            other => ProviderError::ApiError {
                status_code: service_err.raw().status().as_u16(),
                message: format!("Bedrock error: {other:?}"),
            },
        },
        SdkError::TimeoutError(_) => ProviderError::Timeout("Bedrock request timed out".into()),
        other => ProviderError::Network(format!("Bedrock SDK error: {other}")),
    }
}

fn invoke_error(err: &SdkError<InvokeModelError>) -> ProviderError {
    match err {
        SdkError::ServiceError(service_err) => match service_err.err() {
            InvokeModelError::ThrottlingException(e) => ProviderError::RateLimited(e.to_string()),
            InvokeModelError::AccessDeniedException(e) => {
                ProviderError::AuthenticationFailed(e.to_string())
            }
            InvokeModelError::ResourceNotFoundException(e) => {
                ProviderError::ModelNotFound(e.to_string())
            }
            InvokeModelError::ModelTimeoutException(e) => ProviderError::Timeout(e.to_string()),
            InvokeModelError::ValidationException(e) => ProviderError::ApiError {
                status_code: 400,
                message: e.to_string(),
            },
            other => ProviderError::ApiError {
                status_code: service_err.raw().status().as_u16(),
                message: format!("Bedrock error: {other:?}"),
            },
        },
        SdkError::TimeoutError(_) => ProviderError::Timeout("Bedrock request timed out".into()),
        other => ProviderError::Network(format!("Bedrock SDK error: {other}")),
    }
}
