//! `agentdir init`: first-time setup.

use agentdir_config::AppConfig;

pub fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    }

    if config_path.exists() && !force {
        println!("Config already exists at: {}", config_path.display());
        println!("Edit it manually or re-run with --force to overwrite.");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("Wrote config.toml at: {}", config_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set GEMINI_API_KEY (or add api_key to the config file)");
    println!("  2. agentdir run --dir <DIR> --task \"sort these files by type\"");
    Ok(())
}
