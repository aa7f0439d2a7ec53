//! Parley CLI: the main entry point.
//!
//! Commands:
//! - `chat`      : Talk to the assistant in the terminal
//! - `doctor`    : Diagnose configuration, keys and tool endpoints
//! - `tools`     : List every capability the assistant would get
//! - `scratchpad`: Print the assistant's private memory

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley: a conversational assistant with memory and remote tools",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.parley/config.toml
    #[arg(short, long, global = true, env = "PARLEY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Name to talk as (defaults to $USER)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Diagnose system health
    Doctor,

    /// List available capabilities
    Tools,

    /// Print the scratchpad
    Scratchpad,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat { author } => commands::chat::run(cli.config, author).await?,
        Commands::Doctor => commands::doctor::run(cli.config).await?,
        Commands::Tools => commands::tools::run(cli.config).await?,
        Commands::Scratchpad => commands::scratchpad::run(cli.config).await?,
    }

    Ok(())
}
