//! RecordingRunner - in-memory runner for tests
//!
//! Records every invocation and can be scripted to fail or refuse to
//! launch particular stages.

use std::collections::{HashMap, HashSet};

use contracts::{ContractError, RunOutcome, StageInvocation, StageRunner};

#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: Vec<StageInvocation>,
    failures: HashMap<String, Option<i32>>,
    unlaunchable: HashSet<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `stage` finish with a failure outcome.
    pub fn failing_on(mut self, stage: impl Into<String>, code: Option<i32>) -> Self {
        self.failures.insert(stage.into(), code);
        self
    }

    /// Make `stage` fail to launch.
    pub fn unlaunchable(mut self, stage: impl Into<String>) -> Self {
        self.unlaunchable.insert(stage.into());
        self
    }

    pub fn invocations(&self) -> &[StageInvocation] {
        &self.invocations
    }

    /// Ids of invoked stages, in invocation order
    pub fn invoked_stages(&self) -> Vec<&str> {
        self.invocations.iter().map(|i| i.stage_id.as_str()).collect()
    }
}

impl StageRunner for RecordingRunner {
    fn name(&self) -> &str {
        "recording"
    }

    async fn invoke(&mut self, invocation: &StageInvocation) -> Result<RunOutcome, ContractError> {
        let stage = invocation.stage_id.as_str();
        if self.unlaunchable.contains(stage) {
            return Err(ContractError::runner_launch("recording", stage, "scripted launch failure"));
        }
        self.invocations.push(invocation.clone());
        Ok(match self.failures.get(stage) {
            Some(code) => RunOutcome::Failed { code: *code },
            None => RunOutcome::Succeeded,
        })
    }
}
