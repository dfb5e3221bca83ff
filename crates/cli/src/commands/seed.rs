//! `stratus seed` — Load a reference document into a collection.

use std::path::Path;
use stratus_config::AppConfig;
use stratus_store::Ingestor;
use tokio::process::Command;

use crate::runtime;

pub async fn run(collection: &str, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let (doc_type, text) = read_document(file).await?;
    let source = file
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| format!("Bad file name: {}", file.display()))?;

    let embedder = runtime::embedder(&config).await?;
    let store = runtime::open_store(&config).await?;
    let report = Ingestor::new(embedder, store)
        .with_concurrency(config.embedding.concurrency)
        .ingest_text(collection, source, &doc_type, &text)
        .await?;

    println!(
        "✅ Seeded {}: {} chunks embedded, {} written",
        report.collection, report.embedded, report.written
    );
    Ok(())
}

/// Document text and its type tag (the lower-cased extension).
async fn read_document(file: &Path) -> Result<(String, String), Box<dyn std::error::Error>> {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let text = match ext.as_str() {
        "pdf" => pdf_text(file).await?,
        "txt" | "md" | "" => tokio::fs::read_to_string(file).await?,
        other => {
            return Err(
                format!("Unsupported document type '.{other}' (use .txt, .md or .pdf)").into(),
            );
        }
    };
    Ok((if ext.is_empty() { "txt".into() } else { ext }, text))
}

/// Extract PDF text with poppler's `pdftotext`.
async fn pdf_text(file: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg(file)
        .arg("-")
        .output()
        .await
        .map_err(|e| format!("Could not run pdftotext (is poppler installed?): {e}"))?;
    if !output.status.success() {
        return Err(format!(
            "pdftotext failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )
        .into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
