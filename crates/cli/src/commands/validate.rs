//! `validate` command implementation.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use contracts::{ArtifactLookup, ExecutionSelection, PipelineConfig, PipelineRunContext};
use planner::{ArtifactCatalog, ParameterResolver, StageRegistry, StepSelector};
use serde::Serialize;
use tracing::info;

use super::load_config;
use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    overrides: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    project: String,
    experiment: String,
    runner: String,
    entry_point: String,
    selected: Vec<String>,
    skipped: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pins: BTreeMap<String, String>,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.source.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let mut result = ValidationResult {
        valid: false,
        config_path: args.source.config.display().to_string(),
        overrides: args.source.overrides.clone(),
        error: None,
        warnings: None,
        summary: None,
    };

    let config = match load_config(&args.source) {
        Ok(config) => config,
        Err(e) => {
            result.error = Some(format!("{e:#}"));
            return result;
        }
    };

    let registry = StageRegistry::standard();
    let selection = match StepSelector::select_or_all(config.execute_steps.as_ref(), &registry) {
        Ok(selection) => selection,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    // Resolve selected stages without writing computed files
    let catalog = ArtifactCatalog::from_config(&config);
    let context = PipelineRunContext::new(config, ".".into(), ".".into());
    let resolver = ParameterResolver::new(&context, &catalog);
    for stage in registry.stages().iter().filter(|s| selection.contains(&s.id)) {
        if let Err(e) = resolver.check(stage) {
            result.error = Some(e.to_string());
            return result;
        }
    }
    let config = context.config();

    let warnings = collect_warnings(config, &catalog, &registry, &selection);
    result.valid = true;
    result.warnings = if warnings.is_empty() {
        None
    } else {
        Some(warnings)
    };
    result.summary = Some(ConfigSummary {
        project: config.main.project_name.clone(),
        experiment: config.main.experiment_name.clone(),
        runner: config.runner.program.clone(),
        entry_point: config.runner.entry_point.clone(),
        selected: selection.stages().iter().map(|s| s.to_string()).collect(),
        skipped: registry
            .stages()
            .iter()
            .filter(|s| !selection.contains(&s.id))
            .map(|s| s.id.to_string())
            .collect(),
        pins: config.artifact_pins.clone(),
    });
    result
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(
    config: &PipelineConfig,
    catalog: &ArtifactCatalog,
    registry: &StageRegistry,
    selection: &ExecutionSelection,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.execute_steps.is_none() {
        warnings.push("main.execute_steps is not set - every stage will run".to_string());
    }

    // Stage ordering is not enforced: inputs must already exist upstream
    for (stage, artifact) in registry.external_inputs(selection, config) {
        let reference = catalog
            .lookup(&artifact)
            .map(|r| r.to_string())
            .unwrap_or(artifact);
        warnings.push(format!(
            "Stage '{stage}' reads '{reference}', which no selected stage produces"
        ));
    }

    let consumed: BTreeSet<&str> = registry
        .stages()
        .iter()
        .flat_map(|s| s.inputs())
        .filter_map(|a| a.resolve(config))
        .collect();
    for name in config.artifact_pins.keys() {
        if !consumed.contains(name.as_str()) {
            warnings.push(format!(
                "artifacts.pins.{name} does not match any stage input"
            ));
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Project: {}", summary.project);
            println!("  Experiment: {}", summary.experiment);
            println!("  Runner: {} (entry point '{}')", summary.runner, summary.entry_point);
            println!("  Selected: {}", summary.selected.join(", "));
            if !summary.skipped.is_empty() {
                println!("  Skipped: {}", summary.skipped.join(", "));
            }
            for (name, tag) in &summary.pins {
                println!("  Pinned: {name}:{tag}");
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
