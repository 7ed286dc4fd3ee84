//! cardchat CLI — the main entry point.
//!
//! Commands:
//! - `demo`    — Play the scripted sales conversation against the model
//! - `chat`    — Interactive chat with the assistant
//! - `ask`     — Send a single message
//! - `config`  — Show, locate, or initialize configuration
//! - `doctor`  — Diagnose configuration and provider reachability

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "cardchat",
    about = "cardchat — a virtual assistant for credit card sellers",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file (default: ~/.cardchat/config.toml)
    #[arg(short, long, global = true, env = "CARDCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scripted conversation (the built-in sales demo by default)
    Demo {
        /// File with one user input per line (# comments allowed)
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Pause between turns, in milliseconds
        #[arg(short, long)]
        delay_ms: Option<u64>,
    },

    /// Chat with the assistant interactively
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,
    },

    /// Show the effective configuration
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,

        /// Print the config file path only
        #[arg(long, conflicts_with = "init")]
        path: bool,
    },

    /// Diagnose configuration and provider health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so the transcript on stdout stays clean
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Demo { script, delay_ms } => {
            commands::demo::run(config_path, script.as_deref(), delay_ms).await?
        }
        Commands::Chat => commands::chat::run(config_path).await?,
        Commands::Ask { message } => commands::ask::run(config_path, &message).await?,
        Commands::Config { init, path } => {
            if path {
                commands::config_cmd::path(config_path)?
            } else if init {
                commands::config_cmd::init(config_path)?
            } else {
                commands::config_cmd::show(config_path)?
            }
        }
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
