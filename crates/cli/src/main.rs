//! # Pipeline Runner CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading, overrides and validation
//! - Stage selection and fixed-order execution
//! - Graceful shutdown handling

mod cli;
mod commands;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::ObservabilityConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_with_config(observability_config(&cli))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Pipeline runner starting"
    );

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Map CLI logging flags onto the observability setup.
///
/// Only `run` exposes metrics; a port of 0 leaves the exporter off.
fn observability_config(cli: &Cli) -> ObservabilityConfig {
    let default_log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    ObservabilityConfig {
        log_format: cli.log_format.into(),
        metrics_port: match &cli.command {
            Commands::Run(args) if args.metrics_port != 0 => Some(args.metrics_port),
            _ => None,
        },
        default_log_level: default_log_level.to_string(),
        honor_env_filter: !cli.quiet,
    }
}
