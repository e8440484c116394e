//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::PipelineConfig;

use crate::cli::ConfigArgs;

/// Load the configuration file and apply command-line overrides
fn load_config(source: &ConfigArgs) -> Result<PipelineConfig> {
    if !source.config.exists() {
        anyhow::bail!("Configuration file not found: {}", source.config.display());
    }

    config_loader::ConfigLoader::load_with_overrides(&source.config, &source.overrides)
        .with_context(|| format!("Failed to load config from {}", source.config.display()))
}
