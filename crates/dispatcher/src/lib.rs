//! # Dispatcher
//!
//! Stage dispatch module.
//!
//! Responsibilities:
//! - Turn `ResolvedParameters` into a `StageInvocation`
//! - Hand it to a `StageRunner` and wait for completion
//! - Surface failures verbatim: no retries, no cleanup, no diagnosis

pub mod dispatcher;
pub mod error;
pub mod runners;

pub use contracts::{RunOutcome, StageInvocation, StageRunner};
pub use dispatcher::{DispatchReport, StepDispatcher};
pub use error::DispatcherError;
pub use runners::{LogRunner, ProcessRunner, RecordingRunner};
