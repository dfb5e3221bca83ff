//! Stratus CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Write the default config
//! - `ask`     — Interactive chat or single-question mode
//! - `seed`    — Load a reference document into a collection
//! - `image`   — Seed and search the image collection
//! - `doctor`  — Diagnose config, credentials and store

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod render;
mod runtime;

#[derive(Parser)]
#[command(
    name = "stratus",
    about = "Stratus — AWS architecture assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Ask the architect a question
    Ask {
        /// Ask a single question instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Embed a document (.txt, .md or .pdf) into a collection
    Seed {
        /// Target collection, e.g. aws_documentation_vectors
        #[arg(short, long)]
        collection: String,

        /// Document to load
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Image collection commands
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },

    /// Diagnose configuration and connectivity
    Doctor,
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Embed every .jpg in a directory
    Seed {
        /// Directory to scan (defaults to the configured images directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Find the image that best matches a description
    Search {
        /// What the image shows
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Seed { collection, file } => commands::seed::run(&collection, &file).await?,
        Commands::Image { command } => match command {
            ImageCommands::Seed { dir } => commands::image::seed(dir).await?,
            ImageCommands::Search { query } => commands::image::search(&query).await?,
        },
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
