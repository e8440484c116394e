//! StepDispatcher - hands one resolved stage to the runner

use std::time::{Duration, Instant};

use contracts::{
    PipelineRunContext, ResolvedParameters, RunOutcome, StageDefinition, StageId,
    StageInvocation, StageRunner,
};
use tracing::{info, instrument, warn};

use crate::error::DispatcherError;

/// Result of a successful dispatch
#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub stage: StageId,
    pub elapsed: Duration,
}

/// Dispatches stages one at a time through a `StageRunner`
pub struct StepDispatcher<R> {
    runner: R,
    entry_point: String,
}

impl<R: StageRunner> StepDispatcher<R> {
    pub fn new(runner: R, entry_point: impl Into<String>) -> Self {
        Self {
            runner,
            entry_point: entry_point.into(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Build the invocation for `stage`, consuming its parameters.
    pub fn invocation(
        &self,
        context: &PipelineRunContext,
        stage: &StageDefinition,
        params: ResolvedParameters,
    ) -> StageInvocation {
        StageInvocation {
            stage_id: stage.id.clone(),
            directory: context.stage_directory(&stage.directory),
            entry_point: self.entry_point.clone(),
            parameters: params.to_string_map(),
            env: context.tracking().env(),
        }
    }

    /// Run `stage` to completion.
    ///
    /// Returns only once the runner has finished. A failing stage becomes
    /// `DispatcherError::StageFailed` with the runner's exit code.
    #[instrument(
        name = "step_dispatcher_dispatch",
        skip(self, context, stage, params),
        fields(stage = %stage.id, runner = self.runner.name()),
        err(Display)
    )]
    pub async fn dispatch(
        &mut self,
        context: &PipelineRunContext,
        stage: &StageDefinition,
        params: ResolvedParameters,
    ) -> Result<DispatchReport, DispatcherError> {
        let invocation = self.invocation(context, stage, params);
        info!(
            directory = %invocation.directory.display(),
            parameters = ?invocation.parameters,
            "Dispatching stage"
        );

        let started = Instant::now();
        let outcome = self
            .runner
            .invoke(&invocation)
            .await
            .map_err(|e| DispatcherError::launch(stage.id.as_str(), e))?;
        let elapsed = started.elapsed();

        match outcome {
            RunOutcome::Succeeded => {
                info!(elapsed_ms = elapsed.as_millis() as u64, "Stage finished");
                Ok(DispatchReport {
                    stage: stage.id.clone(),
                    elapsed,
                })
            }
            RunOutcome::Failed { code } => {
                warn!(exit_code = ?code, "Stage failed");
                Err(DispatcherError::stage_failed(stage.id.as_str(), code))
            }
        }
    }
}
