//! Pipeline orchestrator - wires configuration, planner, dispatcher and sequencer.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{ExecutionSelection, PipelineConfig, PipelineRunContext, StageRunner};
use dispatcher::{LogRunner, ProcessRunner, StepDispatcher};
use planner::{ArtifactCatalog, StageRegistry, StepSelector};
use sequencer::{ExecutionSequencer, SequenceError, SequenceReport};
use tracing::{info, warn};

use super::PipelineStats;

/// Everything a run needs besides the stage registry
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Loaded and validated configuration, overrides applied
    pub config: PipelineConfig,

    /// Directory holding the stage project directories
    pub root: PathBuf,

    /// Directory generated files are written to
    pub work_dir: PathBuf,

    /// Log invocations instead of launching them
    pub dry_run: bool,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    options: PipelineOptions,
    registry: StageRegistry,
}

impl Pipeline {
    pub fn new(options: PipelineOptions) -> Self {
        Self {
            options,
            registry: StageRegistry::standard(),
        }
    }

    /// Run the selected stages to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let started = Instant::now();
        let Self { options, registry } = self;

        let selection = StepSelector::select_or_all(options.config.execute_steps.as_ref(), &registry)
            .context("Invalid stage selection")?;

        for (stage, artifact) in registry.external_inputs(&selection, &options.config) {
            info!(
                stage = %stage,
                artifact = %artifact,
                "Stage reads an artifact not produced by this run"
            );
        }

        let runner_config = options.config.runner.clone();
        let catalog = ArtifactCatalog::from_config(&options.config);
        let context = PipelineRunContext::new(options.config, options.root, options.work_dir);

        info!(
            project = %context.tracking().project,
            run_group = %context.tracking().run_group,
            selected = ?selection.stages(),
            root = %context.root_path().display(),
            dry_run = options.dry_run,
            "Starting pipeline"
        );

        let outcome = if options.dry_run {
            execute(
                &registry,
                &context,
                &catalog,
                &selection,
                StepDispatcher::new(LogRunner::new("dry-run"), &runner_config.entry_point),
            )
            .await
        } else {
            execute(
                &registry,
                &context,
                &catalog,
                &selection,
                StepDispatcher::new(
                    ProcessRunner::from_config(&runner_config),
                    &runner_config.entry_point,
                ),
            )
            .await
        };

        match outcome {
            Ok(report) => Ok(PipelineStats::from_report(
                &report,
                started.elapsed(),
                options.dry_run,
            )),
            Err(e) => {
                if !e.completed().is_empty() {
                    warn!(
                        completed = ?e.completed(),
                        "Artifacts of completed stages are left in place"
                    );
                }
                Err(e).context("Pipeline aborted")
            }
        }
    }
}

async fn execute<R: StageRunner>(
    registry: &StageRegistry,
    context: &PipelineRunContext,
    catalog: &ArtifactCatalog,
    selection: &ExecutionSelection,
    dispatcher: StepDispatcher<R>,
) -> Result<SequenceReport, SequenceError> {
    let mut sequencer = ExecutionSequencer::new(registry, context, catalog, dispatcher);
    sequencer.run(selection).await
}
