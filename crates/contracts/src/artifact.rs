//! Artifact references exchanged with the artifact store.

use std::fmt;

use crate::ContractError;

/// Version tag meaning "most recently produced artifact with this name".
pub const LATEST_TAG: &str = "latest";

/// Immutable `{name, version_tag}` pair, rendered as `<name>:<version_tag>`.
///
/// Only [`ArtifactReference::new`] builds one, so both parts are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactReference {
    name: String,
    version_tag: String,
}

impl ArtifactReference {
    /// Create a reference; both parts must be non-empty.
    pub fn new(
        name: impl Into<String>,
        version_tag: impl Into<String>,
    ) -> Result<Self, ContractError> {
        let name = name.into();
        let version_tag = version_tag.into();
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                "artifact.name",
                "artifact name cannot be empty",
            ));
        }
        if version_tag.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("artifact[{name}].version_tag"),
                "version tag cannot be empty",
            ));
        }
        Ok(Self { name, version_tag })
    }

    /// Reference to the most recent version of `name`.
    pub fn latest(name: impl Into<String>) -> Result<Self, ContractError> {
        Self::new(name, LATEST_TAG)
    }
}

impl fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version_tag)
    }
}

/// Read-only lookup from artifact name to the reference a stage should
/// consume.
///
/// Populated from the artifact store's point of view; the orchestrator only
/// asks and never inspects storage layout.
pub trait ArtifactLookup {
    fn lookup(&self, name: &str) -> Result<ArtifactReference, ContractError>;
}
