//! `stratus doctor` — Diagnose system health.

use stratus_config::AppConfig;
use stratus_core::store::DocumentStore;

use crate::runtime;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Stratus Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `stratus onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config before running further checks.");
            return Ok(());
        }
    };

    match runtime::chat_provider(&config).await {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("  ✅ Chat provider '{}' reachable", provider.name()),
            Ok(false) => {
                println!("  ⚠️  Chat provider '{}' did not respond", provider.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ Chat provider '{}': {e}", provider.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Chat provider: {e}");
            issues += 1;
        }
    }

    if let Err(e) = runtime::embedder(&config).await {
        println!("  ❌ Embedder: {e}");
        issues += 1;
    } else {
        println!("  ✅ Embedder '{}' configured", config.embedding.provider);
    }

    match runtime::open_store(&config).await {
        Ok(store) => issues += check_collections(store.as_ref(), &config).await,
        Err(e) => {
            println!("  ❌ Store: {e}");
            issues += 1;
        }
    }

    if which_python(&config.interpreter.python).await {
        println!("  ✅ Python interpreter '{}' found", config.interpreter.python);
    } else {
        println!(
            "  ⚠️  Python interpreter '{}' not found — diagrams cannot be drawn",
            config.interpreter.python
        );
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}

async fn check_collections(store: &dyn DocumentStore, config: &AppConfig) -> usize {
    let mut issues = 0;
    for collection in config.store.collections.all() {
        match store.count(collection).await {
            Ok(0) => {
                println!("  ⚠️  Collection '{collection}' is empty");
                issues += 1;
            }
            Ok(n) => println!("  ✅ Collection '{collection}': {n} vectors"),
            Err(e) => {
                println!("  ⚠️  Collection '{collection}': {e}");
                issues += 1;
            }
        }
    }
    issues
}

async fn which_python(python: &str) -> bool {
    tokio::process::Command::new(python)
        .arg("--version")
        .output()
        .await
        .is_ok_and(|o| o.status.success())
}
