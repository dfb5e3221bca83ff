//! `stratus image` — Seed and search the image collection.

use std::path::PathBuf;
use stratus_config::AppConfig;
use stratus_core::embedding::EmbeddingInput;
use stratus_core::store::{MetadataFilter, VectorQuery};
use stratus_store::Ingestor;

use crate::runtime;

/// Embed every `.jpg` in `dir` (default: the configured images directory).
pub async fn seed(dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let dir = dir.unwrap_or_else(|| config.presentation.images_dir.clone());

    let images = load_jpgs(&dir).await?;
    if images.is_empty() {
        println!("⚠️  No .jpg files in {}", dir.display());
        return Ok(());
    }

    let embedder = runtime::embedder(&config).await?;
    let store = runtime::open_store(&config).await?;
    let report = Ingestor::new(embedder, store)
        .with_concurrency(config.embedding.concurrency)
        .ingest_images(&config.store.collections.images, images)
        .await?;

    println!("✅ Seeded {}: {} images", report.collection, report.written);
    Ok(())
}

/// Print the path of the image closest to `query`.
pub async fn search(query: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let embedder = runtime::embedder(&config).await?;
    let store = runtime::open_store(&config).await?;

    let vector = embedder
        .embed(EmbeddingInput::MultimodalText(query.to_string()))
        .await?;
    let query = VectorQuery::new(&config.store.collections.images, vector, 1)
        .with_filter(MetadataFilter::new().eq("type", "jpg"));
    let matches = store.query(query).await?;

    match matches.first() {
        Some(best) => {
            println!("{}", config.presentation.images_dir.join(&best.id).display());
        }
        None => println!("No matching image. Run `stratus image seed` first."),
    }
    Ok(())
}

/// `(file name, bytes)` for each `.jpg` directly inside `dir`, sorted by name.
async fn load_jpgs(
    dir: &std::path::Path,
) -> Result<Vec<(String, Vec<u8>)>, Box<dyn std::error::Error>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| format!("Cannot read {}: {e}", dir.display()))?;

    let mut images = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_jpg = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg"));
        if !is_jpg {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            images.push((name.to_string(), tokio::fs::read(&path).await?));
        }
    }
    images.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(images)
}
