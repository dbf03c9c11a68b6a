//! `taskloop tools`: List registered tools.

use taskloop_agent::Agent;
use taskloop_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let agent = Agent::from_config(&config)?;

    println!("Registered tools ({}):", agent.tools().len());
    for def in agent.tools().definitions() {
        println!("  {:<22} {}", def.name, def.description);
    }

    Ok(())
}
