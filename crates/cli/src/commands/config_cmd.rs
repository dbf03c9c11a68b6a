//! `taskloop config`: Show the effective configuration.

use taskloop_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = AppConfig::config_dir().join("config.toml");

    match AppConfig::load() {
        Ok(config) => {
            if path.exists() {
                println!("# Loaded from {}", path.display());
            } else {
                println!("# No config file at {}; defaults in effect", path.display());
            }
            println!("{}", config.to_toml());
            Ok(())
        }
        Err(e) => {
            eprintln!("Config error: {e}");
            Err(e.into())
        }
    }
}
