//! Wires config into live clients.

use std::sync::Arc;
use stratus_config::AppConfig;
use stratus_core::embedding::Embedder;
use stratus_core::error::StoreError;
use stratus_core::provider::Provider;
use stratus_core::store::DocumentStore;
use stratus_store::InMemoryStore;
use tracing::{info, warn};

/// Open the store named by `[store].backend`.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.store.backend.as_str() {
        "postgres" => {
            let store = stratus_store::PgVectorStore::connect(
                &config.store.database_url,
                config.store.max_connections,
            )
            .await?;
            info!(backend = "postgres", "Store connected");
            Ok(Arc::new(store))
        }
        "memory" => {
            warn!("Using the in-memory store; nothing is persisted between runs");
            Ok(Arc::new(InMemoryStore::new()))
        }
        other => Err(StoreError::Storage(format!("unknown store backend '{other}'"))),
    }
}

pub async fn chat_provider(
    config: &AppConfig,
) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let router = stratus_providers::router::build_from_config(config).await?;
    Ok(router.default().ok_or("No default provider configured")?)
}

pub async fn embedder(config: &AppConfig) -> Result<Arc<dyn Embedder>, Box<dyn std::error::Error>> {
    Ok(stratus_providers::router::build_embedder(config).await?)
}
