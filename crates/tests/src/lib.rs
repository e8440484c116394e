//! # Integration Tests
//!
//! End-to-end runs of the whole orchestration path, configuration text in,
//! recorded stage invocations out. No stage process is launched.

#[cfg(test)]
mod e2e_tests {
    use std::path::{Path, PathBuf};

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        ContractError, ExecutionSelection, PipelineConfig, PipelineRunContext, StageId,
        StageInvocation,
    };
    use dispatcher::{DispatcherError, LogRunner, RecordingRunner, StepDispatcher};
    use planner::{ArtifactCatalog, StageRegistry, StepSelector, MODEL_CONFIG_FILE};
    use sequencer::{ExecutionSequencer, SequenceError, SequenceReport};

    const PROJECT_ROOT: &str = "/srv/pipeline";

    const CONFIG: &str = r#"
[main]
project_name = "exercise_14"
experiment_name = "dev"
execute_steps = "download,preprocess,check_data,segregate,train,evaluate"
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
max_depth = 13
criterion = "gini"

[random_forest_pipeline.features]
numerical = ["danceability", "energy", "loudness"]
categorical = ["time_signature", "key"]
"#;

    fn load(document: &str, overrides: &[&str]) -> PipelineConfig {
        let overrides: Vec<String> = overrides.iter().map(|s| s.to_string()).collect();
        ConfigLoader::load_from_str_with_overrides(document, ConfigFormat::Toml, &overrides)
            .unwrap()
    }

    /// Select, resolve and dispatch through a recording runner.
    async fn run_with(
        config: PipelineConfig,
        runner: RecordingRunner,
        work_dir: &Path,
    ) -> (Result<SequenceReport, SequenceError>, Vec<StageInvocation>) {
        let registry = StageRegistry::standard();
        let selection =
            StepSelector::select_or_all(config.execute_steps.as_ref(), &registry).unwrap();
        let catalog = ArtifactCatalog::from_config(&config);
        let entry_point = config.runner.entry_point.clone();
        let context =
            PipelineRunContext::new(config, PathBuf::from(PROJECT_ROOT), work_dir.to_path_buf());

        let dispatcher = StepDispatcher::new(runner, entry_point);
        let mut sequencer = ExecutionSequencer::new(&registry, &context, &catalog, dispatcher);
        let result = sequencer.run(&selection).await;
        let invocations = sequencer.into_dispatcher().into_runner().invocations().to_vec();
        (result, invocations)
    }

    fn stages(invocations: &[StageInvocation]) -> Vec<&str> {
        invocations.iter().map(|i| i.stage_id.as_str()).collect()
    }

    fn find<'a>(invocations: &'a [StageInvocation], stage: &str) -> &'a StageInvocation {
        invocations
            .iter()
            .find(|i| i.stage_id == stage)
            .unwrap_or_else(|| panic!("{stage} was not invoked"))
    }

    #[tokio::test]
    async fn test_full_run_in_canonical_order() {
        let dir = tempfile::tempdir().unwrap();
        let (result, invocations) =
            run_with(load(CONFIG, &[]), RecordingRunner::new(), dir.path()).await;

        let report = result.unwrap();
        assert_eq!(report.executed().len(), 6);
        assert!(report.skipped().is_empty());
        assert_eq!(
            stages(&invocations),
            vec!["download", "preprocess", "check_data", "segregate", "train", "evaluate"]
        );

        let download = find(&invocations, "download");
        assert_eq!(download.directory, Path::new(PROJECT_ROOT).join("download"));
        assert_eq!(download.entry_point, "main");
        assert_eq!(
            download.parameters["file_url"],
            "https://example.com/genres_mod.parquet"
        );
        assert_eq!(download.parameters["artifact_name"], "raw_data.parquet");

        let check = find(&invocations, "check_data");
        assert_eq!(check.parameters["reference_artifact"], "preprocessed_data.csv:reference");
        assert_eq!(check.parameters["sample_artifact"], "preprocessed_data.csv:latest");
        assert_eq!(check.parameters["ks_alpha"], "0.05");
    }

    #[tokio::test]
    async fn test_string_and_sequence_selections_are_equivalent() {
        let dir = tempfile::tempdir().unwrap();
        let (_, delimited) = run_with(
            load(CONFIG, &["main.execute_steps=download,preprocess"]),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;
        let (_, sequence) = run_with(
            load(CONFIG, &["main.execute_steps=[preprocess, download]"]),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;

        assert_eq!(stages(&delimited), vec!["download", "preprocess"]);
        assert_eq!(delimited, sequence);
    }

    #[tokio::test]
    async fn test_execution_order_ignores_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let (result, invocations) = run_with(
            load(CONFIG, &["main.execute_steps=evaluate,download,segregate"]),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;

        assert_eq!(stages(&invocations), vec!["download", "segregate", "evaluate"]);
        let report = result.unwrap();
        let skipped: Vec<&str> = report.skipped().iter().map(|s| s.as_str()).collect();
        assert_eq!(skipped, vec!["preprocess", "check_data", "train"]);
    }

    #[tokio::test]
    async fn test_unknown_stage_dispatches_nothing() {
        let config = load(CONFIG, &["main.execute_steps=download,bogus_stage"]);
        let registry = StageRegistry::standard();

        let err = StepSelector::select_or_all(config.execute_steps.as_ref(), &registry)
            .unwrap_err();
        assert!(matches!(err, ContractError::UnknownStage { ref stage, .. } if stage == "bogus_stage"));

        // A selection built around the selector is refused before any dispatch
        let dir = tempfile::tempdir().unwrap();
        let catalog = ArtifactCatalog::from_config(&config);
        let context = PipelineRunContext::new(config, PROJECT_ROOT.into(), dir.path().into());
        let selection =
            ExecutionSelection::from_canonical(vec!["download".into(), "bogus_stage".into()]);
        let dispatcher = StepDispatcher::new(RecordingRunner::new(), "main");
        let mut sequencer = ExecutionSequencer::new(&registry, &context, &catalog, dispatcher);

        let err = sequencer.run(&selection).await.unwrap_err();
        assert!(matches!(err, SequenceError::Selection { .. }));
        assert!(sequencer.dispatcher().runner().invocations().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_blocks_stage_and_successors() {
        let document = CONFIG.replace("test_size = 0.3\n", "");
        let dir = tempfile::tempdir().unwrap();
        let (result, invocations) =
            run_with(load(&document, &[]), RecordingRunner::new(), dir.path()).await;

        assert_eq!(stages(&invocations), vec!["download", "preprocess", "check_data"]);
        let err = result.unwrap_err();
        assert_eq!(err.stage().map(|s| s.as_str()), Some("segregate"));
        assert_eq!(err.completed().len(), 3);
        match err {
            SequenceError::Resolution { source, .. } => assert!(matches!(
                source,
                ContractError::MissingConfigKey { ref path, .. } if path == "data.test_size"
            )),
            other => panic!("expected resolution error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_evaluate_alone_reads_latest_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let (result, invocations) = run_with(
            load(CONFIG, &["main.execute_steps=evaluate"]),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(invocations.len(), 1);
        let evaluate = &invocations[0];
        assert_eq!(evaluate.parameters["test_data"], "data_test.csv:latest");
        assert_eq!(evaluate.parameters["model_export"], "model_export:latest");
        assert_eq!(
            evaluate.env,
            vec![
                ("WANDB_PROJECT".to_string(), "exercise_14".to_string()),
                ("WANDB_RUN_GROUP".to_string(), "dev".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_pinned_artifact_version() {
        let document = format!("{CONFIG}\n[artifacts.pins]\n\"data_test.csv\" = \"v2\"\n");
        let dir = tempfile::tempdir().unwrap();
        let (_, invocations) = run_with(
            load(&document, &["main.execute_steps=evaluate"]),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;

        assert_eq!(invocations[0].parameters["test_data"], "data_test.csv:v2");
        assert_eq!(invocations[0].parameters["model_export"], "model_export:latest");
    }

    #[tokio::test]
    async fn test_pin_from_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let (_, invocations) = run_with(
            load(
                CONFIG,
                &[
                    "main.execute_steps=evaluate",
                    "artifacts.pins.data_test.csv=v2",
                    "artifacts.pins.\"model_export\"=v5",
                ],
            ),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;

        assert_eq!(invocations[0].parameters["test_data"], "data_test.csv:v2");
        assert_eq!(invocations[0].parameters["model_export"], "model_export:v5");
    }

    #[tokio::test]
    async fn test_unwritable_work_dir_stops_before_train() {
        let blocker = tempfile::NamedTempFile::new().unwrap();
        let work_dir = blocker.path().join("sub");
        let (result, invocations) = run_with(
            load(CONFIG, &["main.execute_steps=segregate,train,evaluate"]),
            RecordingRunner::new(),
            &work_dir,
        )
        .await;

        assert_eq!(stages(&invocations), vec!["segregate"]);
        let err = result.unwrap_err();
        assert_eq!(err.stage().map(|s| s.as_str()), Some("train"));
        assert_eq!(err.completed().len(), 1);
        match err {
            SequenceError::Resolution { source, .. } => {
                assert!(matches!(source, ContractError::ComputeFailed { .. }));
                assert!(source.to_string().contains("cannot create"), "got: {source}");
            }
            other => panic!("expected resolution error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_failed_stage_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let (result, invocations) = run_with(
            load(CONFIG, &["main.execute_steps=download,preprocess,segregate"]),
            RecordingRunner::new().failing_on("preprocess", Some(1)),
            dir.path(),
        )
        .await;

        assert_eq!(stages(&invocations), vec!["download", "preprocess"]);
        match result.unwrap_err() {
            SequenceError::Dispatch {
                stage,
                source,
                completed,
            } => {
                assert_eq!(stage, "preprocess");
                assert!(matches!(source, DispatcherError::StageFailed { code: Some(1), .. }));
                assert_eq!(completed, vec![StageId::new("download")]);
            }
            other => panic!("expected dispatch error, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_train_writes_model_config() {
        let dir = tempfile::tempdir().unwrap();
        let (_, invocations) = run_with(
            load(CONFIG, &["main.execute_steps=random_forest", "data.test_size=0.25"]),
            RecordingRunner::new(),
            dir.path(),
        )
        .await;

        let train = find(&invocations, "train");
        assert_eq!(train.directory, Path::new(PROJECT_ROOT).join("random_forest"));
        assert_eq!(train.parameters["train_data"], "data_train.csv:latest");
        assert_eq!(train.parameters["val_size"], "0.25");
        assert_eq!(train.parameters["random_seed"], "42");
        assert_eq!(train.parameters["export_artifact"], "model_export");

        let model_config = PathBuf::from(&train.parameters["model_config"]);
        assert!(model_config.is_absolute());
        assert!(model_config.ends_with(MODEL_CONFIG_FILE));

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&model_config).unwrap()).unwrap();
        assert_eq!(written["random_forest"]["n_estimators"], 100);
        assert_eq!(written["features"]["categorical"][1], "key");
    }

    #[tokio::test]
    async fn test_planning_is_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let (_, first) = run_with(load(CONFIG, &[]), RecordingRunner::new(), dir.path()).await;
        let model_config = &find(&first, "train").parameters["model_config"];
        let first_file = std::fs::read_to_string(model_config).unwrap();

        let (_, second) = run_with(load(CONFIG, &[]), RecordingRunner::new(), dir.path()).await;
        let second_file = std::fs::read_to_string(model_config).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_file, second_file);
    }

    #[tokio::test]
    async fn test_dry_run_completes_selection() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(CONFIG, &["main.execute_steps=download,check_data"]);
        let registry = StageRegistry::standard();
        let selection =
            StepSelector::select_or_all(config.execute_steps.as_ref(), &registry).unwrap();
        let catalog = ArtifactCatalog::from_config(&config);
        let context = PipelineRunContext::new(config, PROJECT_ROOT.into(), dir.path().into());
        let dispatcher = StepDispatcher::new(LogRunner::new("dry-run"), "main");

        let report = ExecutionSequencer::new(&registry, &context, &catalog, dispatcher)
            .run(&selection)
            .await
            .unwrap();

        let executed: Vec<&str> = report.executed().iter().map(|s| s.as_str()).collect();
        assert_eq!(executed, vec!["download", "check_data"]);
    }
}
