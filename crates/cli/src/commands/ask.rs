//! `stratus ask` — Interactive or single-question mode.

use std::io::Write;
use std::sync::Arc;
use stratus_agent::{ReactActionSource, ReasoningLoop, SessionConfig};
use stratus_config::AppConfig;
use stratus_tools::{ToolDeps, architect_registry};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::render;
use crate::runtime;

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider = runtime::chat_provider(&config).await?;
    let embedder = runtime::embedder(&config).await?;
    let store = runtime::open_store(&config).await?;

    let deps = ToolDeps::with_local_executors(&config, provider.clone(), embedder, store);
    let registry = Arc::new(architect_registry(&config, &deps)?);
    let source = ReactActionSource::new(provider, &config.default_model, &registry)
        .with_temperature(config.default_temperature)
        .with_max_tokens(config.default_max_tokens);
    let agent = ReasoningLoop::new(registry, Arc::new(source))
        .with_config(SessionConfig::from(&config.agent));

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let reply = answer(&agent, &config, &msg).await;
        eprint!("\r              \r");
        print_reply(&reply);
        return Ok(());
    }

    println!();
    println!("  Stratus — AWS architecture assistant");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Tools:     {}", agent.registry().names().join(", "));
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        eprint!("  ...");
        let reply = answer(&agent, &config, line).await;
        eprint!("\r     \r");
        println!();
        print_reply(&reply);
        println!();
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

struct Reply {
    text: String,
    image: Option<std::path::PathBuf>,
}

/// One fresh session per question.
async fn answer(agent: &ReasoningLoop, config: &AppConfig, question: &str) -> Reply {
    let outcome = agent.run(question).await;
    let text = outcome.reply().to_string();
    let image = outcome
        .is_done()
        .then(|| render::find_image(&text, &config.presentation))
        .flatten();
    Reply { text, image }
}

fn print_reply(reply: &Reply) {
    for line in reply.text.lines() {
        println!("  Architect > {line}");
    }
    if let Some(image) = &reply.image {
        println!("  Image: {}", image.display());
    }
}
