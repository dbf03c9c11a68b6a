//! taskloop CLI: the main entry point.
//!
//! Commands:
//! - `run`    : Process one request, or start an interactive session
//! - `serve`  : Start the HTTP gateway
//! - `tools`  : List the registered tools
//! - `config` : Print the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "taskloop",
    about = "taskloop: a tool-using reasoning agent",
    version
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
    /// Run the agent on a request
    Run {
        /// Process a single request instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Iteration bound per request (1-50)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=50))]
        max_iterations: Option<u16>,

        /// Print the full run result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List registered tools
    Tools,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing; the server logs requests, one-shot runs stay quiet
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve { .. }, false) => "info",
        _ => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run {
            message,
            max_iterations,
            json,
        } => commands::run::run(message, max_iterations.map(usize::from), json).await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Tools => commands::tools::run().await?,
        Commands::Config => commands::config_cmd::run().await?,
    }

    Ok(())
}
