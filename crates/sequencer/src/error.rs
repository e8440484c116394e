//! Sequencer error types

use contracts::{ContractError, StageId};
use dispatcher::DispatcherError;
use thiserror::Error;

/// Why a run was aborted
#[derive(Debug, Error)]
pub enum SequenceError {
    /// Selection names a stage the registry does not know; nothing ran
    #[error("invalid selection: {source}")]
    Selection {
        #[source]
        source: ContractError,
    },

    /// Parameters of `stage` could not be resolved; `stage` was not dispatched
    #[error("stage '{stage}' aborted during parameter resolution: {source}")]
    Resolution {
        stage: StageId,
        #[source]
        source: ContractError,
        completed: Vec<StageId>,
    },

    /// Runner failed for `stage`
    #[error("stage '{stage}' aborted during dispatch: {source}")]
    Dispatch {
        stage: StageId,
        #[source]
        source: DispatcherError,
        completed: Vec<StageId>,
    },
}

impl SequenceError {
    /// Stage that failed, if the failure belongs to one
    pub fn stage(&self) -> Option<&StageId> {
        match self {
            Self::Selection { .. } => None,
            Self::Resolution { stage, .. } | Self::Dispatch { stage, .. } => Some(stage),
        }
    }

    /// Stages that completed before the abort; their artifacts stay in place
    pub fn completed(&self) -> &[StageId] {
        match self {
            Self::Selection { .. } => &[],
            Self::Resolution { completed, .. } | Self::Dispatch { completed, .. } => completed,
        }
    }
}
