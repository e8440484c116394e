//! ExecutionSequencer - fixed-order, fail-fast stage loop

use std::time::Instant;

use contracts::{
    ArtifactLookup, ContractError, ExecutionSelection, PipelineRunContext, StageId, StageRunner,
};
use dispatcher::StepDispatcher;
use planner::{ParameterResolver, StageRegistry};
use tracing::{info, info_span, instrument, Instrument};

use crate::{SequenceError, SequenceReport, StageState, StageVisit};

/// Runs selected stages one at a time in registry order
pub struct ExecutionSequencer<'a, L, R> {
    registry: &'a StageRegistry,
    context: &'a PipelineRunContext,
    resolver: ParameterResolver<'a, L>,
    dispatcher: StepDispatcher<R>,
}

impl<'a, L, R> ExecutionSequencer<'a, L, R>
where
    L: ArtifactLookup,
    R: StageRunner,
{
    pub fn new(
        registry: &'a StageRegistry,
        context: &'a PipelineRunContext,
        artifacts: &'a L,
        dispatcher: StepDispatcher<R>,
    ) -> Self {
        Self {
            registry,
            context,
            resolver: ParameterResolver::new(context, artifacts),
            dispatcher,
        }
    }

    pub fn dispatcher(&self) -> &StepDispatcher<R> {
        &self.dispatcher
    }

    pub fn into_dispatcher(self) -> StepDispatcher<R> {
        self.dispatcher
    }

    /// Run every selected stage in canonical order.
    ///
    /// The first resolution or dispatch error aborts the run; later stages
    /// are neither resolved nor dispatched.
    #[instrument(
        name = "execution_sequencer_run",
        skip(self, selection),
        fields(selected = selection.len(), registered = self.registry.len())
    )]
    pub async fn run(
        &mut self,
        selection: &ExecutionSelection,
    ) -> Result<SequenceReport, SequenceError> {
        self.check_selection(selection)?;

        let started = Instant::now();
        let mut report = SequenceReport::default();
        let mut completed: Vec<StageId> = Vec::new();

        for stage in self.registry.stages() {
            if !selection.contains(&stage.id) {
                info!(stage = %stage.id, "Stage not selected, skipping");
                observability::record_stage_skipped(&stage.id);
                report.visits.push(StageVisit {
                    stage: stage.id.clone(),
                    state: StageState::Skipped,
                });
                continue;
            }

            let span = info_span!("pipeline_stage", stage = %stage.id);

            let params = match span.in_scope(|| self.resolver.resolve(stage)) {
                Ok(params) => params,
                Err(source) => {
                    observability::record_run_finished(false);
                    return Err(SequenceError::Resolution {
                        stage: stage.id.clone(),
                        source,
                        completed,
                    });
                }
            };

            let dispatched = self
                .dispatcher
                .dispatch(self.context, stage, params)
                .instrument(span)
                .await;

            match dispatched {
                Ok(dispatch) => {
                    observability::record_stage_dispatched(&stage.id, true);
                    observability::record_stage_duration_ms(
                        &stage.id,
                        dispatch.elapsed.as_secs_f64() * 1000.0,
                    );
                    completed.push(stage.id.clone());
                    report.visits.push(StageVisit {
                        stage: stage.id.clone(),
                        state: StageState::Completed {
                            elapsed: dispatch.elapsed,
                        },
                    });
                }
                Err(source) => {
                    observability::record_stage_dispatched(&stage.id, false);
                    observability::record_run_finished(false);
                    return Err(SequenceError::Dispatch {
                        stage: stage.id.clone(),
                        source,
                        completed,
                    });
                }
            }
        }

        report.elapsed = started.elapsed();
        observability::record_run_finished(true);
        info!(
            executed = completed.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Pipeline completed"
        );
        Ok(report)
    }

    /// Refuse selections naming stages outside the registry before anything runs.
    fn check_selection(&self, selection: &ExecutionSelection) -> Result<(), SequenceError> {
        match selection
            .stages()
            .iter()
            .find(|id| self.registry.get(id).is_none())
        {
            Some(unknown) => Err(SequenceError::Selection {
                source: ContractError::unknown_stage(unknown.as_str(), self.registry.known_ids()),
            }),
            None => Ok(()),
        }
    }
}
