//! # Sequencer
//!
//! Walks the registry in canonical order and runs every selected stage:
//! resolve parameters, dispatch, advance only on success.
//!
//! ## State machine
//!
//! Each stage is either `SKIP` (not selected) or `RUN`. The run ends
//! `COMPLETED` when every selected stage succeeded, or `ABORTED` at the
//! first resolution or dispatch error. There is no resume: a rerun starts
//! from the first selected stage again.

mod error;
mod report;
mod sequencer;

pub use error::SequenceError;
pub use report::{SequenceReport, StageState, StageVisit};
pub use sequencer::ExecutionSequencer;
