//! ProcessRunner - launches each stage as a child process
//!
//! Command line: `<program> run <stage_dir> -e <entry_point> [-P key=value]... [extra_args]`,
//! which is the `mlflow run` interface. stdout/stderr are inherited so the
//! stage's own logging reaches the terminal.

use std::ffi::OsString;
use std::process::Stdio;

use contracts::{ContractError, RunOutcome, RunnerConfig, StageInvocation, StageRunner};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Runner that spawns one process per stage and waits for it
pub struct ProcessRunner {
    program: String,
    extra_args: Vec<String>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            program: config.program.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Arguments passed after the program name
    pub fn command_args(&self, invocation: &StageInvocation) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "run".into(),
            invocation.directory.clone().into_os_string(),
            "-e".into(),
            invocation.entry_point.clone().into(),
        ];
        for (key, value) in &invocation.parameters {
            args.push("-P".into());
            args.push(format!("{key}={value}").into());
        }
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }
}

impl StageRunner for ProcessRunner {
    fn name(&self) -> &str {
        &self.program
    }

    #[instrument(
        name = "process_runner_invoke",
        skip(self, invocation),
        fields(program = %self.program, stage = %invocation.stage_id)
    )]
    async fn invoke(&mut self, invocation: &StageInvocation) -> Result<RunOutcome, ContractError> {
        let args = self.command_args(invocation);
        debug!(args = ?args, "Spawning stage process");

        // Dropping the future (Ctrl+C, SIGTERM) kills the child with it.
        let status = Command::new(&self.program)
            .args(&args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                ContractError::runner_launch(&self.program, invocation.stage_id.as_str(), e.to_string())
            })?;

        debug!(status = %status, "Stage process exited");
        if status.success() {
            Ok(RunOutcome::Succeeded)
        } else {
            Ok(RunOutcome::Failed {
                code: status.code(),
            })
        }
    }
}
