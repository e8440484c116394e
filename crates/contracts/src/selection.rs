//! Step selection: the raw user value and its normalized form.

use serde::{Deserialize, Serialize};

use crate::{ContractError, StageId};

/// Delimiter for the string form of a selection.
pub const SELECTION_DELIMITER: char = ',';

/// User-supplied step selection as it appears in configuration.
///
/// Either `"download,preprocess"` (typically from a command-line override)
/// or `["download", "preprocess"]` (typically from the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSelection {
    Delimited(String),
    Sequence(Vec<String>),
}

impl RawSelection {
    /// Interpret a configuration value as a selection.
    pub fn from_value(value: &serde_json::Value) -> Result<Self, ContractError> {
        serde_json::from_value(value.clone()).map_err(|_| {
            ContractError::malformed_selection(format!(
                "main.execute_steps must be a string or a list of strings, got {value}"
            ))
        })
    }

    /// Trimmed, non-empty ids in input order (duplicates kept).
    ///
    /// This is the only place the two representations are told apart.
    pub fn segments(&self) -> Vec<&str> {
        let raw: Vec<&str> = match self {
            Self::Delimited(s) => s.split(SELECTION_DELIMITER).collect(),
            Self::Sequence(items) => items.iter().map(String::as_str).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Normalized, deduplicated stage selection in canonical pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ExecutionSelection {
    stages: Vec<StageId>,
}

impl ExecutionSelection {
    /// Build from ids already validated, deduplicated and in canonical order.
    pub fn from_canonical(stages: Vec<StageId>) -> Self {
        Self { stages }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.stages.iter().any(|s| s == id)
    }

    pub fn stages(&self) -> &[StageId] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
