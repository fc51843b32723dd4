//! `citypulse init`, write a starter config file.

use citypulse_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🌆 CityPulse Setup");
    println!("==================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run init.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Add your keys to {}:", config_path.display());
    println!("      llm.api_key (OpenRouter) enables the LLM policy");
    println!("      providers.serpapi_api_key enables news headlines");
    println!("   2. Run: citypulse ask \"Cebu City\"");
    println!("\n🎉 Setup complete!\n");

    Ok(())
}
