//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatch-phase errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// The stage ran and reported failure
    #[error("stage '{stage}' failed: {}", describe_exit(.code))]
    StageFailed { stage: String, code: Option<i32> },

    /// The stage could not be started
    #[error("stage '{stage}' could not be launched: {source}")]
    Launch {
        stage: String,
        #[source]
        source: ContractError,
    },
}

impl DispatcherError {
    pub fn stage_failed(stage: impl Into<String>, code: Option<i32>) -> Self {
        Self::StageFailed {
            stage: stage.into(),
            code,
        }
    }

    pub fn launch(stage: impl Into<String>, source: ContractError) -> Self {
        Self::Launch {
            stage: stage.into(),
            source,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
