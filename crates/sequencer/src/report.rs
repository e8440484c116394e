//! Run report

use std::time::Duration;

use contracts::StageId;

/// What happened to one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageState {
    /// Not selected
    Skipped,
    /// Selected, resolved and dispatched successfully
    Completed { elapsed: Duration },
}

#[derive(Debug, Clone)]
pub struct StageVisit {
    pub stage: StageId,
    pub state: StageState,
}

/// Report of a completed run, one visit per registry stage in canonical order
#[derive(Debug, Clone, Default)]
pub struct SequenceReport {
    pub visits: Vec<StageVisit>,
    pub elapsed: Duration,
}

impl SequenceReport {
    /// Stages that ran, in execution order
    pub fn executed(&self) -> Vec<&StageId> {
        self.visits
            .iter()
            .filter(|v| matches!(v.state, StageState::Completed { .. }))
            .map(|v| &v.stage)
            .collect()
    }

    pub fn skipped(&self) -> Vec<&StageId> {
        self.visits
            .iter()
            .filter(|v| v.state == StageState::Skipped)
            .map(|v| &v.stage)
            .collect()
    }
}
