//! `run` command implementation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::load_config;
use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineOptions};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(
        config = %args.source.config.display(),
        overrides = args.source.overrides.len(),
        "Loading configuration"
    );

    let config = load_config(&args.source)?;

    info!(
        project = %config.main.project_name,
        experiment = %config.main.experiment_name,
        runner = %config.runner.program,
        pins = config.artifact_pins.len(),
        "Configuration loaded"
    );

    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let options = PipelineOptions {
        config,
        root: absolute_or(args.root.as_deref(), &cwd)?,
        work_dir: absolute_or(args.work_dir.as_deref(), &cwd)?,
        dry_run: args.dry_run,
    };

    let pipeline = Pipeline::new(options);
    let shutdown_signal = shutdown_signal();

    // Dropping the pipeline future kills a running stage process.
    tokio::select! {
        result = pipeline.run() => {
            let stats = result.context("Pipeline execution failed")?;
            info!(
                executed = stats.executed.len(),
                skipped = stats.skipped.len(),
                duration_secs = stats.duration.as_secs_f64(),
                "Pipeline completed successfully"
            );
            stats.print_summary();
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
            anyhow::bail!("Pipeline interrupted before completion");
        }
    }

    Ok(())
}

fn absolute_or(path: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    match path {
        Some(path) => std::path::absolute(path)
            .with_context(|| format!("Failed to resolve path {}", path.display())),
        None => Ok(cwd.to_path_buf()),
    }
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
