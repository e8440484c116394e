//! PipelineRunContext - process-wide, immutable run state
//!
//! Built once at startup and shared by reference. The tracking bindings
//! are handed to every stage process explicitly instead of being written
//! into the orchestrator's own environment.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::PipelineConfig;

/// Environment variable naming the tracking project.
pub const TRACKING_PROJECT_VAR: &str = "WANDB_PROJECT";

/// Environment variable naming the tracking run group.
pub const TRACKING_RUN_GROUP_VAR: &str = "WANDB_RUN_GROUP";

/// Names the experiment tracker groups runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingBindings {
    pub project: String,
    pub run_group: String,
}

impl TrackingBindings {
    /// `(variable, value)` pairs for the stage process environment.
    pub fn env(&self) -> Vec<(String, String)> {
        vec![
            (TRACKING_PROJECT_VAR.to_string(), self.project.clone()),
            (TRACKING_RUN_GROUP_VAR.to_string(), self.run_group.clone()),
        ]
    }
}

/// Immutable context for one orchestrator run
#[derive(Debug, Clone)]
pub struct PipelineRunContext {
    config: Arc<PipelineConfig>,
    tracking: TrackingBindings,
    root_path: PathBuf,
    work_dir: PathBuf,
}

impl PipelineRunContext {
    /// `root_path` holds the stage directories; computed files land in `work_dir`.
    pub fn new(config: PipelineConfig, root_path: PathBuf, work_dir: PathBuf) -> Self {
        let tracking = TrackingBindings {
            project: config.main.project_name.clone(),
            run_group: config.main.experiment_name.clone(),
        };
        Self {
            config: Arc::new(config),
            tracking,
            root_path,
            work_dir,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn tracking(&self) -> &TrackingBindings {
        &self.tracking
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Working directory of a stage.
    pub fn stage_directory(&self, directory: &str) -> PathBuf {
        self.root_path.join(directory)
    }
}
