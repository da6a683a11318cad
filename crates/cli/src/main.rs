//! Binary entry point.
//!
//! Two subcommands: `chat` (interactive, or one-shot with `-m`) and
//! `config` (parse and display the active configuration).

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "infoagent",
    about = "InfoAgent — a tool-using research assistant in your terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat {
        /// Send a single message and exit (omit for interactive mode)
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Validate and show the current configuration
    Config,
}

/// RUST_LOG wins when set; otherwise the -v flag picks the level.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Config => commands::config_cmd::run().await?,
    }

    Ok(())
}
