//! # demo-rx
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading, overrides and validation
//! - Receiver assembly and the subscription lifecycle
//! - Exit on Ctrl+C / SIGTERM

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_receiver, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    observability::init(&cli.observability_config())?;

    info!(version = env!("CARGO_PKG_VERSION"), "demo-rx starting");

    let result = match &cli.command {
        Commands::Run(args) => run_receiver(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
