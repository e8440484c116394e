//! Stage registry
//!
//! The registry's declaration order is the canonical execution order.
//! Dependencies between stages are implicit: a stage expects its
//! predecessor's artifact to exist under the `latest` tag. Nothing checks
//! that a producer ran before a consumer.

use std::collections::HashSet;

use contracts::{ExecutionSelection, ParameterSource, PipelineConfig, StageDefinition, StageId};

/// Artifact names fixed by the stage contracts
pub mod artifacts {
    pub const RAW_DATA: &str = "raw_data.parquet";
    pub const PREPROCESSED_DATA: &str = "preprocessed_data.csv";
    pub const TRAIN_DATA: &str = "data_train.csv";
    pub const TEST_DATA: &str = "data_test.csv";
}

/// File the training sub-configuration is serialized to
pub const MODEL_CONFIG_FILE: &str = "random_forest_config.json";

/// Fixed catalog of stages, in canonical order
#[derive(Debug, Clone)]
pub struct StageRegistry {
    stages: Vec<StageDefinition>,
}

impl StageRegistry {
    /// Build a registry from definitions in canonical order.
    pub fn new(stages: Vec<StageDefinition>) -> Self {
        Self { stages }
    }

    /// The six-stage data/model pipeline.
    pub fn standard() -> Self {
        use ParameterSource as P;

        Self::new(vec![
            StageDefinition::new("download", "download")
                .param("file_url", P::config("data.file_url"))
                .param("artifact_name", P::constant(artifacts::RAW_DATA))
                .param("artifact_type", P::constant("raw_data"))
                .param("artifact_description", P::constant("Data as downloaded"))
                .produces(artifacts::RAW_DATA),
            StageDefinition::new("preprocess", "preprocess")
                .param("input_artifact", P::artifact(artifacts::RAW_DATA))
                .param("artifact_name", P::constant(artifacts::PREPROCESSED_DATA))
                .param("artifact_type", P::constant("preprocessed_data"))
                .param(
                    "artifact_description",
                    P::constant("Data with preprocessing applied"),
                )
                .produces(artifacts::PREPROCESSED_DATA),
            StageDefinition::new("check_data", "check_data")
                .param("reference_artifact", P::config("data.reference_dataset"))
                .param("sample_artifact", P::artifact(artifacts::PREPROCESSED_DATA))
                .param("ks_alpha", P::config("data.ks_alpha")),
            StageDefinition::new("segregate", "segregate")
                .param("input_artifact", P::artifact(artifacts::PREPROCESSED_DATA))
                .param("artifact_root", P::constant("data"))
                .param("artifact_type", P::constant("segregated_data"))
                .param("test_size", P::config("data.test_size"))
                .param("stratify", P::config("data.stratify"))
                .produces(artifacts::TRAIN_DATA)
                .produces(artifacts::TEST_DATA),
            StageDefinition::new("train", "random_forest")
                .alias("random_forest")
                .param("train_data", P::artifact(artifacts::TRAIN_DATA))
                .param(
                    "model_config",
                    P::serialized_section("random_forest_pipeline", MODEL_CONFIG_FILE),
                )
                .param(
                    "export_artifact",
                    P::config("random_forest_pipeline.export_artifact"),
                )
                .param("random_seed", P::config("main.random_seed"))
                .param("val_size", P::config("data.test_size"))
                .param("stratify", P::config("data.stratify"))
                .produces_from_config("random_forest_pipeline.export_artifact"),
            StageDefinition::new("evaluate", "evaluate")
                .param(
                    "model_export",
                    P::artifact_from_config("random_forest_pipeline.export_artifact"),
                )
                .param("test_data", P::artifact(artifacts::TEST_DATA)),
        ])
    }

    /// Stages in canonical order
    pub fn stages(&self) -> &[StageDefinition] {
        &self.stages
    }

    /// Look up by canonical id only
    pub fn get(&self, id: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Look up by id or alias
    pub fn find(&self, name: &str) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.answers_to(name))
    }

    /// Artifacts consumed by selected stages that no earlier selected stage
    /// produces. Those must already exist in the artifact store; nothing here
    /// checks that they do. Names that cannot be resolved from `config` are
    /// left to the resolver to report.
    pub fn external_inputs(
        &self,
        selection: &ExecutionSelection,
        config: &PipelineConfig,
    ) -> Vec<(StageId, String)> {
        let mut produced: HashSet<&str> = HashSet::new();
        let mut external = Vec::new();
        for stage in self.stages.iter().filter(|s| selection.contains(&s.id)) {
            for artifact in stage.inputs().filter_map(|a| a.resolve(config)) {
                if !produced.contains(artifact) {
                    external.push((stage.id.clone(), artifact.to_string()));
                }
            }
            produced.extend(stage.outputs.iter().filter_map(|a| a.resolve(config)));
        }
        external
    }

    /// Canonical ids joined for error messages
    pub fn known_ids(&self) -> String {
        self.stages
            .iter()
            .map(|s| s.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
