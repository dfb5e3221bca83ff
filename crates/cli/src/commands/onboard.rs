//! `stratus onboard` — First-time setup.

use stratus_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Stratus — First-Time Setup");
    println!("==========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Configure AWS credentials (aws configure) or set a provider API key");
    println!("   2. Start Postgres with pgvector and check [store].database_url");
    println!("   3. Seed the reference documents:");
    println!("        stratus seed -c aws_documentation_vectors -f wellarchitected-framework.pdf");
    println!("        stratus seed -c web_service_documentation_vectors -f aws-overview.pdf");
    println!("        stratus seed -c diagrams_documentation_vectors -f diagrams.md");
    println!("   4. Run: stratus doctor, then stratus ask\n");

    Ok(())
}
