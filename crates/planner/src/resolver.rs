//! Parameter resolution
//!
//! Turns a stage's parameter template into the flat mapping handed to the
//! runner. Resolution is all-or-nothing: the first failing entry aborts the
//! stage. Side-effect-free entries resolve first, so a missing config key
//! never leaves a computed file behind.

use std::path::PathBuf;

use contracts::{
    ArtifactLookup, ArtifactName, Computation, ContractError, ParamValue, ParameterBinding,
    ParameterSource, PipelineRunContext, ResolvedParameters, StageDefinition,
};
use serde_json::Value;
use tracing::{debug, instrument};

/// Resolves stage templates against the run context and artifact lookup
pub struct ParameterResolver<'a, L> {
    context: &'a PipelineRunContext,
    artifacts: &'a L,
}

impl<'a, L: ArtifactLookup> ParameterResolver<'a, L> {
    pub fn new(context: &'a PipelineRunContext, artifacts: &'a L) -> Self {
        Self { context, artifacts }
    }

    /// Resolve every template entry of `stage`.
    ///
    /// Calling this twice with unchanged inputs yields equal results; the
    /// only side effect is rewriting the same computed files.
    #[instrument(
        name = "parameter_resolver_resolve",
        skip(self, stage),
        fields(stage = %stage.id, entries = stage.parameters.len()),
        err(Display)
    )]
    pub fn resolve(&self, stage: &StageDefinition) -> Result<ResolvedParameters, ContractError> {
        let (computed, pure): (Vec<&ParameterBinding>, Vec<&ParameterBinding>) = stage
            .parameters
            .iter()
            .partition(|b| b.source.is_computed());

        let mut resolved = ResolvedParameters::new(stage.id.clone());
        for binding in pure.into_iter().chain(computed) {
            let value = self.resolve_binding(stage, binding)?;
            debug!(parameter = %binding.name, value = %value, "Parameter resolved");
            resolved.insert(binding.name.clone(), value);
        }
        Ok(resolved)
    }

    /// Resolve `stage` without side effects: computed entries only confirm
    /// that their source section exists, nothing is written to disk.
    pub fn check(&self, stage: &StageDefinition) -> Result<(), ContractError> {
        for binding in &stage.parameters {
            match &binding.source {
                ParameterSource::Computed {
                    computation: Computation::SerializeSection { section, .. },
                } => {
                    self.config_value(stage, binding, section)?;
                }
                _ => {
                    self.resolve_binding(stage, binding)?;
                }
            }
        }
        Ok(())
    }

    fn resolve_binding(
        &self,
        stage: &StageDefinition,
        binding: &ParameterBinding,
    ) -> Result<ParamValue, ContractError> {
        match &binding.source {
            ParameterSource::ConfigPath { path } => {
                let value = self.config_value(stage, binding, path)?;
                ParamValue::from_json(value).ok_or_else(|| {
                    ContractError::invalid_parameter(
                        stage.id.as_str(),
                        &binding.name,
                        format!("'{path}' must be a scalar, found {}", kind_of(value)),
                    )
                })
            }
            ParameterSource::Constant { value } => Ok(value.clone()),
            ParameterSource::Artifact { name } => {
                let name = match name {
                    ArtifactName::Fixed(name) => name.clone(),
                    ArtifactName::FromConfig(path) => self
                        .config_value(stage, binding, path)?
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            ContractError::invalid_parameter(
                                stage.id.as_str(),
                                &binding.name,
                                format!("artifact name at '{path}' must be a string"),
                            )
                        })?,
                };
                let reference = self.artifacts.lookup(&name).map_err(|e| {
                    ContractError::invalid_parameter(stage.id.as_str(), &binding.name, e.to_string())
                })?;
                Ok(ParamValue::Text(reference.to_string()))
            }
            ParameterSource::Computed { computation } => {
                self.compute(stage, binding, computation).map(|path| {
                    ParamValue::Text(path.to_string_lossy().into_owned())
                })
            }
        }
    }

    fn config_value(
        &self,
        stage: &StageDefinition,
        binding: &ParameterBinding,
        path: &str,
    ) -> Result<&'a Value, ContractError> {
        self.context
            .config()
            .lookup(path)
            .ok_or_else(|| ContractError::missing_config_key(stage.id.as_str(), &binding.name, path))
    }

    fn compute(
        &self,
        stage: &StageDefinition,
        binding: &ParameterBinding,
        computation: &Computation,
    ) -> Result<PathBuf, ContractError> {
        let fail = |message: String, source: Box<dyn std::error::Error + Send + Sync>| {
            ContractError::ComputeFailed {
                stage: stage.id.to_string(),
                parameter: binding.name.clone(),
                message,
                source: Some(source),
            }
        };

        match computation {
            Computation::SerializeSection { section, file_name } => {
                let value = self.config_value(stage, binding, section)?;
                let content = serde_json::to_string_pretty(value)
                    .map_err(|e| fail(format!("cannot serialize '{section}'"), Box::new(e)))?;

                let dir = self.context.work_dir();
                std::fs::create_dir_all(dir)
                    .map_err(|e| fail(format!("cannot create {}", dir.display()), Box::new(e)))?;
                let path = std::path::absolute(dir.join(file_name))
                    .map_err(|e| fail(format!("cannot resolve path of {file_name}"), Box::new(e)))?;
                std::fs::write(&path, content)
                    .map_err(|e| fail(format!("cannot write {}", path.display()), Box::new(e)))?;

                debug!(section = %section, path = %path.display(), "Section serialized");
                Ok(path)
            }
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactCatalog, StageRegistry, MODEL_CONFIG_FILE};
    use contracts::PipelineConfig;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn document() -> Value {
        json!({
            "main": {
                "project_name": "exercise_14",
                "experiment_name": "dev",
                "random_seed": 42
            },
            "data": {
                "file_url": "https://example.com/genres_mod.parquet",
                "reference_dataset": "preprocessed_data.csv:reference",
                "ks_alpha": 0.05,
                "test_size": 0.3,
                "stratify": "genre"
            },
            "random_forest_pipeline": {
                "export_artifact": "model_export",
                "random_forest": { "n_estimators": 100, "max_depth": 13 }
            }
        })
    }

    fn context(doc: Value, work_dir: &std::path::Path) -> PipelineRunContext {
        let config = PipelineConfig::from_document(doc).unwrap();
        PipelineRunContext::new(config, "/project".into(), work_dir.to_path_buf())
    }

    fn stage(id: &str) -> StageDefinition {
        StageRegistry::standard().get(id).unwrap().clone()
    }

    #[test]
    fn test_download_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(document(), dir.path());
        let catalog = ArtifactCatalog::default();
        let params = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("download"))
            .unwrap();

        let map = params.to_string_map();
        assert_eq!(map["file_url"], "https://example.com/genres_mod.parquet");
        assert_eq!(map["artifact_name"], "raw_data.parquet");
        assert_eq!(map["artifact_type"], "raw_data");
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn test_evaluate_artifact_references() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(document(), dir.path());
        let catalog = ArtifactCatalog::default();
        let params = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("evaluate"))
            .unwrap();

        assert_eq!(params.get("test_data"), Some(&ParamValue::from("data_test.csv:latest")));
        assert_eq!(params.get("model_export"), Some(&ParamValue::from("model_export:latest")));
    }

    #[test]
    fn test_pinned_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(document(), dir.path());
        let catalog = ArtifactCatalog::new(BTreeMap::from([(
            "preprocessed_data.csv".to_string(),
            "v1".to_string(),
        )]));
        let params = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("check_data"))
            .unwrap();

        assert_eq!(params.to_string_map()["sample_artifact"], "preprocessed_data.csv:v1");
        assert_eq!(params.get("ks_alpha"), Some(&ParamValue::Float(0.05)));
    }

    #[test]
    fn test_train_serializes_section() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(document(), dir.path());
        let catalog = ArtifactCatalog::default();
        let params = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("train"))
            .unwrap();

        let map = params.to_string_map();
        let config_path = PathBuf::from(&map["model_config"]);
        assert!(config_path.is_absolute());
        assert!(config_path.ends_with(MODEL_CONFIG_FILE));

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
        assert_eq!(written["random_forest"]["max_depth"], 13);
        assert_eq!(map["random_seed"], "42");
        assert_eq!(map["val_size"], "0.3");
        assert_eq!(map["export_artifact"], "model_export");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(document(), dir.path());
        let catalog = ArtifactCatalog::default();
        let resolver = ParameterResolver::new(&ctx, &catalog);
        let train = stage("train");
        assert_eq!(resolver.resolve(&train).unwrap(), resolver.resolve(&train).unwrap());
    }

    #[test]
    fn test_missing_key_fails_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = document();
        doc["main"].as_object_mut().unwrap().remove("random_seed");
        let ctx = context(doc, dir.path());
        let catalog = ArtifactCatalog::default();

        let err = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("train"))
            .unwrap_err();

        assert!(err.is_resolution_error());
        assert!(err.to_string().contains("main.random_seed"), "got: {err}");
        assert!(!dir.path().join(MODEL_CONFIG_FILE).exists());
    }

    #[test]
    fn test_unwritable_work_dir_fails_computation() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let work_dir = blocker.path().join("sub");
        let ctx = context(document(), &work_dir);
        let catalog = ArtifactCatalog::default();

        let err = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("train"))
            .unwrap_err();

        assert!(matches!(err, ContractError::ComputeFailed { .. }), "got: {err:?}");
        assert!(err.is_resolution_error());
        let message = err.to_string();
        assert!(message.contains("stage 'train' parameter 'model_config'"), "got: {message}");
        assert!(message.contains("cannot create"), "got: {message}");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_check_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("work");
        let ctx = context(document(), &work_dir);
        let catalog = ArtifactCatalog::default();
        let resolver = ParameterResolver::new(&ctx, &catalog);

        for stage in StageRegistry::standard().stages() {
            resolver.check(stage).unwrap();
        }
        assert!(!work_dir.exists());
    }

    #[test]
    fn test_check_reports_missing_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = document();
        doc["data"].as_object_mut().unwrap().remove("file_url");
        doc.as_object_mut().unwrap().remove("random_forest_pipeline");
        let ctx = context(doc, dir.path());
        let catalog = ArtifactCatalog::default();
        let resolver = ParameterResolver::new(&ctx, &catalog);

        let err = resolver.check(&stage("download")).unwrap_err();
        assert!(err.to_string().contains("data.file_url"), "got: {err}");

        let err = resolver.check(&stage("train")).unwrap_err();
        assert!(matches!(err, ContractError::MissingConfigKey { .. }), "got: {err:?}");
    }

    #[test]
    fn test_non_scalar_config_value_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = document();
        doc["data"]["stratify"] = json!(["genre", "year"]);
        let ctx = context(doc, dir.path());
        let catalog = ArtifactCatalog::default();

        let err = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("segregate"))
            .unwrap_err();
        assert!(matches!(err, ContractError::InvalidParameter { .. }));
        assert!(err.to_string().contains("a list"), "got: {err}");
    }

    #[test]
    fn test_artifact_name_from_config_must_be_string() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = document();
        doc["random_forest_pipeline"]["export_artifact"] = json!(7);
        let ctx = context(doc, dir.path());
        let catalog = ArtifactCatalog::default();

        let err = ParameterResolver::new(&ctx, &catalog)
            .resolve(&stage("evaluate"))
            .unwrap_err();
        assert!(err.to_string().contains("must be a string"), "got: {err}");
    }
}
