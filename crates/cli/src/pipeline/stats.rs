//! Run statistics.

use std::time::Duration;

use contracts::StageId;
use sequencer::{SequenceReport, StageState};

/// Statistics from a completed pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Stages that ran, in execution order, with their runner time
    pub executed: Vec<(StageId, Duration)>,

    /// Stages left out of the selection
    pub skipped: Vec<StageId>,

    /// Wall time of the whole run, including resolution
    pub duration: Duration,

    /// Invocations were logged, not launched
    pub dry_run: bool,
}

impl PipelineStats {
    pub fn from_report(report: &SequenceReport, duration: Duration, dry_run: bool) -> Self {
        let mut stats = Self {
            duration,
            dry_run,
            ..Self::default()
        };
        for visit in &report.visits {
            match visit.state {
                StageState::Completed { elapsed } => {
                    stats.executed.push((visit.stage.clone(), elapsed))
                }
                StageState::Skipped => stats.skipped.push(visit.stage.clone()),
            }
        }
        stats
    }

    pub fn executed_ids(&self) -> Vec<&str> {
        self.executed.iter().map(|(id, _)| id.as_str()).collect()
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        let title = if self.dry_run {
            "Pipeline Dry Run"
        } else {
            "Pipeline Summary"
        };
        println!("\n=== {title} ===\n");

        println!("Overview");
        println!("  Duration: {:.2}s", self.duration.as_secs_f64());
        println!("  Stages executed: {}", self.executed.len());
        println!("  Stages skipped: {}", self.skipped.len());

        if !self.executed.is_empty() {
            println!("\nExecuted");
            for (stage, elapsed) in &self.executed {
                println!("  - {:<12} {:>8.2}s", stage.as_str(), elapsed.as_secs_f64());
            }
        }

        if !self.skipped.is_empty() {
            let names: Vec<&str> = self.skipped.iter().map(StageId::as_str).collect();
            println!("\nSkipped: {}", names.join(", "));
        }

        println!();
    }
}
