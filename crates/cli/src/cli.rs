//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Pipeline Runner - staged data/model pipeline orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "pipeline-runner",
    author,
    version,
    about = "Staged data/model pipeline orchestrator",
    long_about = "Runs the download, preprocess, check_data, segregate, train and evaluate\n\
                  stages in fixed order, each as an isolated project run.\n\n\
                  The stage subset comes from `main.execute_steps`; any configuration\n\
                  key can be overridden with trailing `key=value` arguments."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "PIPELINE_RUNNER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "PIPELINE_RUNNER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the selected pipeline stages
    Run(RunArgs),

    /// Validate configuration and stage selection without running
    Validate(ValidateArgs),

    /// Display the stage registry and resolved selection
    Info(InfoArgs),
}

/// Configuration source shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "PIPELINE_RUNNER_CONFIG"
    )]
    pub config: PathBuf,

    /// Configuration overrides, e.g. `main.execute_steps=download,preprocess`
    #[arg(value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Directory containing one project directory per stage (default: cwd)
    #[arg(long, env = "PIPELINE_RUNNER_ROOT")]
    pub root: Option<PathBuf>,

    /// Directory for generated files such as the model configuration (default: cwd)
    #[arg(long, env = "PIPELINE_RUNNER_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Resolve every selected stage and log the invocations without launching them
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "PIPELINE_RUNNER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: ConfigArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show each stage's parameter template
    #[arg(long)]
    pub parameters: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
