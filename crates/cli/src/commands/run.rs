//! `taskloop run`: Single-request or interactive mode.

use taskloop_agent::Agent;
use taskloop_config::AppConfig;
use taskloop_core::agent::{RunResult, RunState};
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    max_iterations: Option<usize>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let agent = Agent::from_config(&config)?;
    let bound = max_iterations.unwrap_or(agent.max_iterations());

    if let Some(msg) = message {
        let result = agent.run(&msg, bound).await;
        print_result(&result, json)?;
        return Ok(());
    }

    println!();
    println!("  taskloop: interactive mode");
    println!();
    println!("  Tools:     {}", agent.tools().names().join(", "));
    println!("  Iterations per request: {bound}");
    println!();
    println!("  Type a request and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if matches!(input, "exit" | "quit") {
            break;
        }
        if !input.is_empty() {
            let result = agent.run(input, bound).await;
            println!();
            print_result(&result, json)?;
            println!();
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_result(result: &RunResult, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", result.to_json()?);
        return Ok(());
    }

    for line in result.scratchpad() {
        println!("  | {line}");
    }
    println!();
    println!("{}", result.final_text);
    if result.state == RunState::Failed {
        eprintln!("  [run {} ended in a failed state]", result.run_id);
    }
    Ok(())
}
