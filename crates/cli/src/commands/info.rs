//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{ExecutionSelection, ParameterBinding, PipelineConfig, StageDefinition};
use planner::{StageRegistry, StepSelector};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::InfoArgs;

/// Pipeline info for JSON output
#[derive(Serialize)]
struct PipelineInfo {
    project: String,
    experiment: String,
    runner: RunnerInfo,
    stages: Vec<StageInfo>,
}

#[derive(Serialize)]
struct RunnerInfo {
    program: String,
    entry_point: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra_args: Vec<String>,
}

#[derive(Serialize)]
struct StageInfo {
    id: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<String>,
    directory: String,
    selected: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parameters: Vec<ParameterBinding>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.source.config.display(), "Loading pipeline info");

    let config = load_config(&args.source)?;
    let registry = StageRegistry::standard();
    let selection = StepSelector::select_or_all(config.execute_steps.as_ref(), &registry)
        .context("Invalid stage selection")?;

    let pipeline = build_pipeline_info(&config, &registry, &selection, args.parameters);
    if args.json {
        let json =
            serde_json::to_string_pretty(&pipeline).context("Failed to serialize pipeline info")?;
        println!("{}", json);
    } else {
        print_pipeline_info(&pipeline);
    }

    Ok(())
}

fn build_pipeline_info(
    config: &PipelineConfig,
    registry: &StageRegistry,
    selection: &ExecutionSelection,
    with_parameters: bool,
) -> PipelineInfo {
    let stage_info = |stage: &StageDefinition| StageInfo {
        id: stage.id.to_string(),
        aliases: stage.aliases.clone(),
        directory: stage.directory.clone(),
        selected: selection.contains(&stage.id),
        parameters: if with_parameters {
            stage.parameters.clone()
        } else {
            Vec::new()
        },
    };

    PipelineInfo {
        project: config.main.project_name.clone(),
        experiment: config.main.experiment_name.clone(),
        runner: RunnerInfo {
            program: config.runner.program.clone(),
            entry_point: config.runner.entry_point.clone(),
            extra_args: config.runner.extra_args.clone(),
        },
        stages: registry.stages().iter().map(stage_info).collect(),
    }
}

fn print_pipeline_info(pipeline: &PipelineInfo) {
    println!("\n=== Pipeline ===\n");
    println!("Tracking");
    println!("  Project: {}", pipeline.project);
    println!("  Run group: {}", pipeline.experiment);

    println!("\nRunner");
    println!("  Program: {}", pipeline.runner.program);
    println!("  Entry point: {}", pipeline.runner.entry_point);
    if !pipeline.runner.extra_args.is_empty() {
        println!("  Extra args: {}", pipeline.runner.extra_args.join(" "));
    }

    println!("\nStages ({}, in execution order)", pipeline.stages.len());
    for stage in &pipeline.stages {
        let mark = if stage.selected { "x" } else { " " };
        let aliases = if stage.aliases.is_empty() {
            String::new()
        } else {
            format!(" (alias: {})", stage.aliases.join(", "))
        };
        println!("  [{mark}] {}{aliases} -> {}/", stage.id, stage.directory);
        for param in &stage.parameters {
            println!("        {} <- {}", param.name, describe(param));
        }
    }

    println!();
}

fn describe(param: &ParameterBinding) -> String {
    use contracts::{ArtifactName, Computation, ParameterSource};

    match &param.source {
        ParameterSource::ConfigPath { path } => format!("config {path}"),
        ParameterSource::Constant { value } => format!("\"{value}\""),
        ParameterSource::Computed {
            computation: Computation::SerializeSection { section, file_name },
        } => format!("{section} written to {file_name}"),
        ParameterSource::Artifact {
            name: ArtifactName::Fixed(name),
        } => format!("artifact {name}"),
        ParameterSource::Artifact {
            name: ArtifactName::FromConfig(path),
        } => format!("artifact named by {path}"),
    }
}
