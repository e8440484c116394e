//! Configuration validation
//!
//! Rules:
//! - main.project_name / main.experiment_name non-empty
//! - runner.program / runner.entry_point non-empty
//! - artifacts.pins names and tags non-empty
//!
//! Stage selection is checked against the registry by the planner, not here.

use contracts::{ContractError, PipelineConfig};
use validator::{Validate, ValidationErrors};

/// Validate a PipelineConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &PipelineConfig) -> Result<(), ContractError> {
    config
        .main
        .validate()
        .map_err(|e| first_error("main", &e))?;
    config
        .runner
        .validate()
        .map_err(|e| first_error("runner", &e))?;
    validate_artifact_pins(config)?;
    Ok(())
}

/// Collapse validator output into the first field error, by field name.
fn first_error(section: &str, errors: &ValidationErrors) -> ContractError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.first().and_then(|(field, errs)| errs.first().map(|e| (field, e))) {
        Some((field, err)) => ContractError::config_validation(
            format!("{section}.{field}"),
            err.message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string()),
        ),
        None => ContractError::config_validation(section, errors.to_string()),
    }
}

fn validate_artifact_pins(config: &PipelineConfig) -> Result<(), ContractError> {
    for (name, tag) in &config.artifact_pins {
        if name.trim().is_empty() {
            return Err(ContractError::config_validation(
                "artifacts.pins",
                "artifact name cannot be empty",
            ));
        }
        if tag.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("artifacts.pins[{name}]"),
                "version tag cannot be empty",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(doc: serde_json::Value) -> PipelineConfig {
        PipelineConfig::from_document(doc).unwrap()
    }

    fn minimal() -> serde_json::Value {
        json!({ "main": { "project_name": "p", "experiment_name": "dev" } })
    }

    #[test]
    fn test_valid_config() {
        assert!(validate(&config(minimal())).is_ok());
    }

    #[test]
    fn test_empty_project_name() {
        let mut doc = minimal();
        doc["main"]["project_name"] = json!("");
        let err = validate(&config(doc)).unwrap_err().to_string();
        assert!(err.contains("main.project_name"), "got: {err}");
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_empty_runner_program() {
        let mut doc = minimal();
        doc["runner"] = json!({ "program": "" });
        let err = validate(&config(doc)).unwrap_err().to_string();
        assert!(err.contains("runner.program"), "got: {err}");
    }

    #[test]
    fn test_empty_pin_tag() {
        let mut doc = minimal();
        doc["artifacts"] = json!({ "pins": { "raw_data.parquet": " " } });
        let err = validate(&config(doc)).unwrap_err().to_string();
        assert!(err.contains("version tag cannot be empty"), "got: {err}");
    }
}
