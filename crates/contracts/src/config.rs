//! PipelineConfig - Config Loader output
//!
//! The full configuration document plus the typed sections the
//! orchestrator itself relies on. Stage parameters read arbitrary dotted
//! paths from the document; everything else goes through typed fields.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use validator::Validate;

use crate::{ContractError, RawSelection};

/// `main` section
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MainConfig {
    /// Project grouping name for the experiment tracker
    #[validate(length(min = 1, message = "project_name cannot be empty"))]
    pub project_name: String,

    /// Run-group name for the experiment tracker
    #[validate(length(min = 1, message = "experiment_name cannot be empty"))]
    pub experiment_name: String,
}

/// `runner` section: how stages are launched
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RunnerConfig {
    /// Executable invoked for every stage
    #[serde(default = "default_runner_program")]
    #[validate(length(min = 1, message = "runner program cannot be empty"))]
    pub program: String,

    /// Entry point passed to the runner
    #[serde(default = "default_entry_point")]
    #[validate(length(min = 1, message = "entry point cannot be empty"))]
    pub entry_point: String,

    /// Extra arguments appended after the stage parameters
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_runner_program() -> String {
    "mlflow".to_string()
}

fn default_entry_point() -> String {
    "main".to_string()
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            program: default_runner_program(),
            entry_point: default_entry_point(),
            extra_args: Vec::new(),
        }
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Tracking names
    pub main: MainConfig,

    /// `main.execute_steps`; `None` selects every registered stage
    pub execute_steps: Option<RawSelection>,

    /// Runner settings
    pub runner: RunnerConfig,

    /// `artifacts.pins`: artifact name -> version tag used instead of `latest`
    pub artifact_pins: BTreeMap<String, String>,

    document: Value,
}

impl PipelineConfig {
    /// Extract the typed sections from a parsed document.
    ///
    /// Only shape is checked here; value rules live in the config loader.
    pub fn from_document(document: Value) -> Result<Self, ContractError> {
        if !document.is_object() {
            return Err(ContractError::config_parse(
                "configuration root must be a table",
            ));
        }

        let main: MainConfig = required_section(&document, "main")?;
        let execute_steps = lookup_path(&document, "main.execute_steps")
            .map(RawSelection::from_value)
            .transpose()?;
        let runner: RunnerConfig = optional_section(&document, "runner")?.unwrap_or_default();
        let artifact_pins: BTreeMap<String, String> =
            optional_section(&document, "artifacts.pins")?.unwrap_or_default();

        Ok(Self {
            main,
            execute_steps,
            runner,
            artifact_pins,
            document,
        })
    }

    /// Read a nested value by dotted path (`data.test_size`).
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup_path(&self.document, path)
    }

    /// The whole document, after overrides.
    pub fn document(&self) -> &Value {
        &self.document
    }
}

/// Walk a dotted path through tables; numeric segments index into lists.
pub fn lookup_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn required_section<T: DeserializeOwned>(document: &Value, path: &str) -> Result<T, ContractError> {
    optional_section(document, path)?
        .ok_or_else(|| ContractError::config_parse(format!("missing required section '{path}'")))
}

fn optional_section<T: DeserializeOwned>(
    document: &Value,
    path: &str,
) -> Result<Option<T>, ContractError> {
    lookup_path(document, path)
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|e| ContractError::ConfigParse {
                message: format!("invalid section '{path}': {e}"),
                source: Some(Box::new(e)),
            })
        })
        .transpose()
}
