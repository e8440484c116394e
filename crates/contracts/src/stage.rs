//! StageDefinition - static description of one pipeline stage
//!
//! Each stage names the directory handed to the runner and a parameter
//! template describing where every runner parameter comes from.

use serde::Serialize;

use crate::{ParamValue, PipelineConfig, StageId};

/// Where a single runner parameter comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParameterSource {
    /// Dotted path into the configuration document, e.g. `data.file_url`
    ConfigPath { path: String },

    /// Fixed value passed through unchanged
    Constant { value: ParamValue },

    /// Value produced by a side-effecting computation before dispatch
    Computed { computation: Computation },

    /// Artifact produced by an earlier stage
    Artifact { name: ArtifactName },
}

impl ParameterSource {
    pub fn config(path: impl Into<String>) -> Self {
        Self::ConfigPath { path: path.into() }
    }

    pub fn constant(value: impl Into<ParamValue>) -> Self {
        Self::Constant {
            value: value.into(),
        }
    }

    pub fn artifact(name: impl Into<String>) -> Self {
        Self::Artifact {
            name: ArtifactName::Fixed(name.into()),
        }
    }

    /// Artifact whose name is itself read from configuration.
    pub fn artifact_from_config(path: impl Into<String>) -> Self {
        Self::Artifact {
            name: ArtifactName::FromConfig(path.into()),
        }
    }

    pub fn serialized_section(section: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self::Computed {
            computation: Computation::SerializeSection {
                section: section.into(),
                file_name: file_name.into(),
            },
        }
    }

    /// Computed sources have side effects and are resolved last.
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed { .. })
    }
}

/// Artifact name, fixed or looked up in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactName {
    Fixed(String),
    FromConfig(String),
}

impl ArtifactName {
    /// Concrete name under `config`; `None` when a config-sourced name is
    /// missing or not a string.
    pub fn resolve<'a>(&'a self, config: &'a PipelineConfig) -> Option<&'a str> {
        match self {
            Self::Fixed(name) => Some(name.as_str()),
            Self::FromConfig(path) => config.lookup(path).and_then(|v| v.as_str()),
        }
    }
}

/// Side-effecting computations available to parameter templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Computation {
    /// Write a configuration sub-section to `<work_dir>/<file_name>` and
    /// pass the absolute path.
    SerializeSection { section: String, file_name: String },
}

/// One `name -> source` entry of a parameter template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterBinding {
    pub name: String,
    pub source: ParameterSource,
}

impl ParameterBinding {
    pub fn new(name: impl Into<String>, source: ParameterSource) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// Static stage description, owned by the registry and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct StageDefinition {
    /// Canonical stage id
    pub id: StageId,

    /// Alternative ids accepted in selections
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Directory relative to the project root handed to the runner
    pub directory: String,

    /// Parameter template, in declaration order
    pub parameters: Vec<ParameterBinding>,

    /// Artifacts this stage writes to the artifact store
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<ArtifactName>,
}

impl StageDefinition {
    pub fn new(id: &str, directory: impl Into<String>) -> Self {
        Self {
            id: StageId::new(id),
            aliases: Vec::new(),
            directory: directory.into(),
            parameters: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn produces(mut self, artifact: impl Into<String>) -> Self {
        self.outputs.push(ArtifactName::Fixed(artifact.into()));
        self
    }

    /// Output whose name is read from configuration.
    pub fn produces_from_config(mut self, path: impl Into<String>) -> Self {
        self.outputs.push(ArtifactName::FromConfig(path.into()));
        self
    }

    pub fn param(mut self, name: impl Into<String>, source: ParameterSource) -> Self {
        self.parameters.push(ParameterBinding::new(name, source));
        self
    }

    /// Whether `name` is this stage's id or one of its aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.id == name || self.aliases.iter().any(|a| a == name)
    }

    /// Artifacts this stage consumes, in template order.
    pub fn inputs(&self) -> impl Iterator<Item = &ArtifactName> {
        self.parameters.iter().filter_map(|p| match &p.source {
            ParameterSource::Artifact { name } => Some(name),
            _ => None,
        })
    }
}
