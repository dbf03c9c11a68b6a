//! `taskloop serve`: Start the HTTP API server.

use taskloop_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("taskloop gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Automation: {}",
        config.automation.command.as_deref().unwrap_or("unavailable")
    );

    taskloop_gateway::start(config).await?;

    Ok(())
}
