//! # Planner
//!
//! Decides what runs and with which parameters, without running anything.
//!
//! Responsibilities:
//! - `StageRegistry`: fixed catalog of stages in canonical order
//! - `StepSelector`: raw selection -> validated `ExecutionSelection`
//! - `ParameterResolver`: stage template -> `ResolvedParameters`
//! - `ArtifactCatalog`: artifact name -> reference to consume

mod catalog;
mod registry;
mod resolver;
mod selector;

pub use catalog::ArtifactCatalog;
pub use registry::{artifacts, StageRegistry, MODEL_CONFIG_FILE};
pub use resolver::ParameterResolver;
pub use selector::StepSelector;
