//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Apply `dotted.key=value` command-line overrides
//! - Validate configuration legality
//! - Generate `PipelineConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let overrides = vec!["main.execute_steps=download,preprocess".to_string()];
//! let config = ConfigLoader::load_with_overrides(Path::new("config.toml"), &overrides).unwrap();
//! println!("Project: {}", config.main.project_name);
//! ```

mod overrides;
mod parser;
mod validator;

pub use contracts::PipelineConfig;
pub use overrides::Override;
pub use parser::ConfigFormat;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<PipelineConfig, ContractError> {
        Self::load_with_overrides(path, &[])
    }

    /// Load configuration from file path, then apply `key=value` overrides
    /// before validation.
    pub fn load_with_overrides(
        path: &Path,
        overrides: &[String],
    ) -> Result<PipelineConfig, ContractError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str_with_overrides(&content, format, overrides)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<PipelineConfig, ContractError> {
        Self::load_from_str_with_overrides(content, format, &[])
    }

    /// Load configuration from string with overrides
    pub fn load_from_str_with_overrides(
        content: &str,
        format: ConfigFormat,
        overrides: &[String],
    ) -> Result<PipelineConfig, ContractError> {
        let overrides = overrides
            .iter()
            .map(|arg| Override::parse(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Self::parse_and_validate(content, format, &overrides)
    }

    /// Serialize the effective document (after overrides) to pretty JSON
    pub fn to_json(config: &PipelineConfig) -> Result<String, ContractError> {
        serde_json::to_string_pretty(config.document())
            .map_err(|e| ContractError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ContractError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ContractError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            ContractError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ContractError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse, override and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
        overrides: &[Override],
    ) -> Result<PipelineConfig, ContractError> {
        let mut document = parser::parse(content, format)?;
        for ov in overrides {
            debug!(key = %ov.key(), value = %ov.value, "Applying config override");
        }
        overrides::apply(&mut document, overrides)?;
        let config = PipelineConfig::from_document(document)?;
        validator::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::RawSelection;
    use std::io::Write;

    const MINIMAL_TOML: &str = r#"
[main]
project_name = "exercise_14"
experiment_name = "dev"
execute_steps = ["download", "preprocess", "check_data", "segregate", "train", "evaluate"]
random_seed = 42

[data]
file_url = "https://example.com/genres_mod.parquet"
reference_dataset = "preprocessed_data.csv:reference"
ks_alpha = 0.05
test_size = 0.3
stratify = "genre"

[random_forest_pipeline]
export_artifact = "model_export"

[random_forest_pipeline.random_forest]
n_estimators = 100
"#;

    #[test]
    fn test_load_from_str_toml() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        assert_eq!(config.main.project_name, "exercise_14");
        assert_eq!(config.lookup("data.ks_alpha"), Some(&serde_json::json!(0.05)));
        assert!(matches!(config.execute_steps, Some(RawSelection::Sequence(_))));
    }

    #[test]
    fn test_override_switches_selection_to_string_form() {
        let overrides = vec!["main.execute_steps=download,preprocess".to_string()];
        let config =
            ConfigLoader::load_from_str_with_overrides(MINIMAL_TOML, ConfigFormat::Toml, &overrides)
                .unwrap();
        assert_eq!(
            config.execute_steps,
            Some(RawSelection::Delimited("download,preprocess".into()))
        );
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let overrides = vec!["main.experiment_name=''".to_string()];
        let result =
            ConfigLoader::load_from_str_with_overrides(MINIMAL_TOML, ConfigFormat::Toml, &overrides);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("experiment_name"), "got: {err}");
    }

    #[test]
    fn test_pin_override_with_dotted_artifact_name() {
        let overrides = vec![
            "artifacts.pins.data_test.csv=v2".to_string(),
            "artifacts.pins.\"raw_data.parquet\"=v0".to_string(),
        ];
        let config =
            ConfigLoader::load_from_str_with_overrides(MINIMAL_TOML, ConfigFormat::Toml, &overrides)
                .unwrap();
        assert_eq!(config.artifact_pins.get("data_test.csv").map(String::as_str), Some("v2"));
        assert_eq!(config.artifact_pins.get("raw_data.parquet").map(String::as_str), Some("v0"));
    }

    #[test]
    fn test_round_trip_json() {
        let config = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&config).unwrap();
        let again = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(config.document(), again.document());
    }

    #[test]
    fn test_load_from_path_detects_format() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();
        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.main.experiment_name, "dev");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let err = ConfigLoader::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }
}
