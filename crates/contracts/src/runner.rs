//! StageRunner trait - external stage-runner boundary
//!
//! A runner receives a fully resolved invocation and blocks (asynchronously)
//! until the external unit finishes.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::{ContractError, StageId};

/// Everything a runner needs to launch one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageInvocation {
    pub stage_id: StageId,

    /// Stage working directory
    pub directory: PathBuf,

    /// Entry point inside the stage project
    pub entry_point: String,

    /// Flat string parameters
    pub parameters: BTreeMap<String, String>,

    /// Extra environment for the stage process
    pub env: Vec<(String, String)>,
}

/// How an external stage finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    /// `code` is `None` when the process was terminated by a signal
    Failed { code: Option<i32> },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Stage runner trait
///
/// `Err` means the stage could not be launched at all; a stage that ran and
/// failed is `Ok(RunOutcome::Failed { .. })`.
#[trait_variant::make(StageRunner: Send)]
pub trait LocalStageRunner {
    /// Runner name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Run one stage to completion.
    async fn invoke(&mut self, invocation: &StageInvocation) -> Result<RunOutcome, ContractError>;
}
