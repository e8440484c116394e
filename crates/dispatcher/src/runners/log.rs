//! LogRunner - logs the invocation instead of running it (dry runs)

use contracts::{ContractError, RunOutcome, StageInvocation, StageRunner};
use tracing::info;

/// Runner that only logs what would be launched
pub struct LogRunner {
    name: String,
}

impl LogRunner {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl StageRunner for LogRunner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&mut self, invocation: &StageInvocation) -> Result<RunOutcome, ContractError> {
        info!(
            runner = %self.name,
            stage = %invocation.stage_id,
            directory = %invocation.directory.display(),
            entry_point = %invocation.entry_point,
            parameters = ?invocation.parameters,
            "Dry run: stage not launched"
        );
        Ok(RunOutcome::Succeeded)
    }
}
