//! Artifact catalog: which version of an artifact a stage consumes

use std::collections::BTreeMap;

use contracts::{ArtifactLookup, ArtifactReference, ContractError, PipelineConfig};

/// Answers `latest` for every artifact unless a pin names another tag.
///
/// Which concrete version `latest` denotes is decided by the artifact
/// store at the time the stage reads it.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCatalog {
    pins: BTreeMap<String, String>,
}

impl ArtifactCatalog {
    pub fn new(pins: BTreeMap<String, String>) -> Self {
        Self { pins }
    }

    /// Catalog using the `artifacts.pins` section of the configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.artifact_pins.clone())
    }
}

impl ArtifactLookup for ArtifactCatalog {
    fn lookup(&self, name: &str) -> Result<ArtifactReference, ContractError> {
        match self.pins.get(name) {
            Some(tag) => ArtifactReference::new(name, tag.as_str()),
            None => ArtifactReference::latest(name),
        }
    }
}
