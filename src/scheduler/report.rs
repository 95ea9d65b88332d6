// src/scheduler/report.rs - Status lines and execution summaries
use super::tasks::{TaskOutcome, TaskResult};
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::io::Write;
use std::time::Duration;

const BANNER: &str = "========== Task Summary ==========";
const RULE: &str = "==================================";

/// Aggregate counts over a set of results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub aborted: usize,
    /// Sum of per-task durations. Not the batch's elapsed wall time when tasks overlap.
    #[serde(rename = "total_duration_ms", serialize_with = "as_millis")]
    pub total_duration: Duration,
}

impl Summary {
    pub fn from_results<E>(results: &[TaskResult<E>]) -> Self {
        results.iter().fold(Summary::default(), |mut summary, result| {
            summary.total += 1;
            summary.total_duration += result.duration;
            match result.outcome {
                TaskOutcome::Success => summary.succeeded += 1,
                TaskOutcome::Failure(_) => summary.failed += 1,
                TaskOutcome::Aborted { .. } => summary.aborted += 1,
            }
            summary
        })
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

/// One-line completion notice for a single task.
pub fn status_line<E: Display>(result: &TaskResult<E>) -> String {
    match &result.outcome {
        TaskOutcome::Success => {
            format!("✓ task '{}' finished in {:?}", result.name, result.duration)
        }
        TaskOutcome::Failure(err) => {
            format!("✗ task '{}' failed after {:?}: {}", result.name, result.duration, err)
        }
        TaskOutcome::Aborted { reason } => {
            format!("✗ task '{}' aborted after {:?}: {}", result.name, result.duration, reason)
        }
    }
}

/// Render the summary table for `results` in stored order.
pub fn write_summary<E, W: Write>(results: &[TaskResult<E>], out: &mut W) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", BANNER)?;
    for result in results {
        writeln!(
            out,
            "task: {:<15} | status: {:<7} | duration: {:>12}",
            result.name,
            result.outcome.label(),
            format!("{:?}", result.duration)
        )?;
    }
    let summary = Summary::from_results(results);
    writeln!(out, "total duration: {:?}", summary.total_duration)?;
    writeln!(out, "{}", RULE)?;
    Ok(())
}
