//! Layered error definitions
//!
//! Categorized by phase: config / selection / resolution / runner

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Selection Errors =====
    /// Stage id not present in the registry
    #[error("unknown stage '{stage}' in selection (known stages: {known})")]
    UnknownStage { stage: String, known: String },

    /// Selection value has the wrong shape or selects nothing
    #[error("malformed step selection: {message}")]
    MalformedSelection { message: String },

    // ===== Resolution Errors =====
    /// Parameter template refers to a configuration key that does not exist
    #[error("stage '{stage}' parameter '{parameter}': missing configuration key '{path}'")]
    MissingConfigKey {
        stage: String,
        parameter: String,
        path: String,
    },

    /// Configuration value exists but cannot be passed as a parameter
    #[error("stage '{stage}' parameter '{parameter}': {message}")]
    InvalidParameter {
        stage: String,
        parameter: String,
        message: String,
    },

    /// Computed parameter failed (serialization or file write)
    #[error("stage '{stage}' parameter '{parameter}': computation failed: {message}")]
    ComputeFailed {
        stage: String,
        parameter: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Runner Errors =====
    /// Stage runner could not be launched
    #[error("runner '{runner}' failed to launch stage '{stage}': {message}")]
    RunnerLaunch {
        runner: String,
        stage: String,
        message: String,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown stage error
    pub fn unknown_stage(stage: impl Into<String>, known: impl Into<String>) -> Self {
        Self::UnknownStage {
            stage: stage.into(),
            known: known.into(),
        }
    }

    /// Create malformed selection error
    pub fn malformed_selection(message: impl Into<String>) -> Self {
        Self::MalformedSelection {
            message: message.into(),
        }
    }

    /// Create missing configuration key error
    pub fn missing_config_key(
        stage: impl Into<String>,
        parameter: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::MissingConfigKey {
            stage: stage.into(),
            parameter: parameter.into(),
            path: path.into(),
        }
    }

    /// Create invalid parameter error
    pub fn invalid_parameter(
        stage: impl Into<String>,
        parameter: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            stage: stage.into(),
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create runner launch error
    pub fn runner_launch(
        runner: impl Into<String>,
        stage: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::RunnerLaunch {
            runner: runner.into(),
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Whether this error belongs to the selection phase
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownStage { .. } | Self::MalformedSelection { .. }
        )
    }

    /// Whether this error belongs to the parameter resolution phase
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfigKey { .. } | Self::InvalidParameter { .. } | Self::ComputeFailed { .. }
        )
    }
}
