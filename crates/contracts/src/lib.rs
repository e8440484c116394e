//! # Contracts
//!
//! Frozen interface contracts shared by every pipeline crate: stage
//! definitions, artifact references, selections, resolved parameters, the
//! run context and the stage-runner boundary.
//! Every other crate depends on this one; it depends on none of them.
//!
//! ## Artifact model
//! - Artifacts are addressed as `<name>:<version_tag>`
//! - `latest` denotes the most recently produced version; resolving it is
//!   the artifact store's job, never the orchestrator's

mod artifact;
mod config;
mod context;
mod error;
mod parameters;
mod runner;
mod selection;
mod stage;
mod stage_id;

pub use artifact::*;
pub use config::*;
pub use context::*;
pub use error::*;
pub use parameters::*;
pub use runner::*;
pub use selection::*;
pub use stage::*;
pub use stage_id::StageId;
