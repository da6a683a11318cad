//! `infoagent config` — Configuration inspection.

use infoagent_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Checking configuration...");

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            println!("   ❌ {e}");
            return Err(e.into());
        }
    };
    println!("   ✅ Config file parsed");

    let mut warnings: Vec<&str> = Vec::new();
    if !config.has_api_key() {
        warnings.push("No API key set (set INFOAGENT_API_KEY or OPENROUTER_API_KEY)");
    }
    if config.search_api_key.is_none() {
        warnings.push("No search API key set (web_search will be unavailable)");
    }

    if warnings.is_empty() {
        println!("   ✅ Everything looks good");
    } else {
        println!();
        for warning in &warnings {
            println!("   ⚠️  {warning}");
        }
    }

    println!();
    println!("   Provider:        {}", config.provider);
    println!("   Model:           {}", config.model);
    println!("   Temperature:     {}", config.temperature);
    println!("   Max iterations:  {}", config.max_iterations);
    println!(
        "   Config file:     {}",
        AppConfig::config_dir().join("config.toml").display()
    );

    Ok(())
}
