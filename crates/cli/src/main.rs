//! NeuroQueue CLI — the main entry point.
//!
//! Commands:
//! - `chat`    — Run the agent pipeline on one message or interactively
//! - `config`  — Show the effective configuration
//! - `doctor`  — Diagnose the generation backend and document store

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "neuroqueue",
    about = "NeuroQueue — multi-agent orchestration over salience-weighted memory",
    version,
    author
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
    /// Run the agent pipeline
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Run agents concurrently and merge their outputs
        #[arg(long)]
        parallel: bool,

        /// Disable document retrieval for this session
        #[arg(long)]
        no_rag: bool,

        /// Reference document passed to the analyst
        #[arg(long, value_name = "FILE")]
        docs: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Print the config file location instead
        #[arg(long)]
        path: bool,
    },

    /// Diagnose system health
    Doctor,
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
        Commands::Chat {
            message,
            parallel,
            no_rag,
            docs,
        } => {
            commands::chat::run(commands::chat::ChatOptions {
                message,
                parallel,
                no_rag,
                docs,
            })
            .await?
        }
        Commands::Config { path } => {
            if path {
                commands::config_cmd::path().await?
            } else {
                commands::config_cmd::show().await?
            }
        }
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
