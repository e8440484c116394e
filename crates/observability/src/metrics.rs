//! Pipeline metrics
//!
//! Without an installed recorder these calls are no-ops.

use metrics::{counter, histogram};

/// Record a dispatched stage and its outcome
pub fn record_stage_dispatched(stage: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "pipeline_stages_dispatched_total",
        "stage" => stage.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a stage skipped because it was not selected
pub fn record_stage_skipped(stage: &str) {
    counter!("pipeline_stages_skipped_total", "stage" => stage.to_string()).increment(1);
}

/// Record how long a stage's runner took
pub fn record_stage_duration_ms(stage: &str, duration_ms: f64) {
    histogram!("pipeline_stage_duration_ms", "stage" => stage.to_string()).record(duration_ms);
}

/// Record the terminal state of a whole run
pub fn record_run_finished(success: bool) {
    let status = if success { "completed" } else { "aborted" };
    counter!("pipeline_runs_total", "status" => status).increment(1);
}
