//! Provider router — builds chat and embedding backends from config.

use std::collections::HashMap;
use std::sync::Arc;
use stratus_config::AppConfig;
use stratus_core::embedding::Embedder;
use stratus_core::error::ProviderError;
use stratus_core::provider::Provider;
use tracing::info;
use crate::openai_compat::OpenAiCompatProvider;

/// Routes model requests to the configured provider.
pub struct ProviderRouter {
    providers: HashMap<String, Arc<dyn Provider>>,
    default_provider: String,
}

impl ProviderRouter {
    /// Create a new router with a default provider.
    pub fn new(default_provider: impl Into<String>) -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider.into(),
        }
    }

    /// Register a provider.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        self.providers.insert(name.into(), provider);
    }

    /// Get the default provider.
    pub fn default(&self) -> Option<Arc<dyn Provider>> {
        self.providers.get(&self.default_provider).cloned()
    }

    /// Get a specific provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.get(name).cloned()
    }

    /// List all registered provider names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Build chat providers from configuration.
///
/// Every `[providers.<name>]` section becomes an OpenAI-compatible provider;
/// the default provider is always present.
pub async fn build_from_config(config: &AppConfig) -> Result<ProviderRouter, ProviderError> {
    let mut router = ProviderRouter::new(&config.default_provider);

    for (name, provider_config) in &config.providers {
        let base_url = provider_config
            .api_url
            .clone()
            .unwrap_or_else(|| default_base_url(name));
        let api_key = config.api_key_for(name).unwrap_or_default();
        router.register(
            name.clone(),
            Arc::new(OpenAiCompatProvider::new(name, &base_url, &api_key)),
        );
    }

    if router.get(&config.default_provider).is_none() {
        let provider = default_chat_provider(config).await?;
        router.register(config.default_provider.clone(), provider);
    }

    info!(providers = ?router.list(), default = %config.default_provider, "Providers ready");
    Ok(router)
}

async fn default_chat_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    if config.default_provider == "bedrock" {
        return bedrock_provider(config).await;
    }
    let api_key = config.api_key_for(&config.default_provider).unwrap_or_default();
    let base_url = default_base_url(&config.default_provider);
    Ok(Arc::new(OpenAiCompatProvider::new(
        &config.default_provider,
        &base_url,
        &api_key,
    )))
}

#[cfg(feature = "bedrock")]
async fn bedrock_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let client = crate::bedrock::connect(&config.region, config.aws_profile.as_deref()).await;
    Ok(Arc::new(crate::bedrock::BedrockProvider::new(client, &config.region)))
}

#[cfg(not(feature = "bedrock"))]
async fn bedrock_provider(_config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    Err(ProviderError::NotConfigured(
        "built without the \"bedrock\" feature".into(),
    ))
}

/// Build the embedder named by `[embedding].provider`.
pub async fn build_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>, ProviderError> {
    let embedding = &config.embedding;
    if embedding.provider == "bedrock" {
        return bedrock_embedder(config).await;
    }

    let provider_config = config.providers.get(&embedding.provider);
    let model = provider_config
        .and_then(|p| p.embedding_model.clone())
        .unwrap_or_else(|| embedding.text_model.clone());
    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(&embedding.provider));
    let api_key = config.api_key_for(&embedding.provider).unwrap_or_default();

    Ok(Arc::new(
        OpenAiCompatProvider::new(&embedding.provider, &base_url, &api_key)
            .with_embedding_model(model, embedding.dimension),
    ))
}

#[cfg(feature = "bedrock")]
async fn bedrock_embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>, ProviderError> {
    let client = crate::bedrock::connect(&config.region, config.aws_profile.as_deref()).await;
    Ok(Arc::new(crate::bedrock::TitanEmbedder::new(
        client,
        &config.embedding.text_model,
        &config.embedding.image_model,
        config.embedding.dimension,
    )))
}

#[cfg(not(feature = "bedrock"))]
async fn bedrock_embedder(_config: &AppConfig) -> Result<Arc<dyn Embedder>, ProviderError> {
    Err(ProviderError::NotConfigured(
        "built without the \"bedrock\" feature".into(),
    ))
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "openai" => "https://api.openai.com/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "together" => "https://api.together.xyz/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        _ => format!("https://{provider_name}.api.example.com/v1"),
    }
}
