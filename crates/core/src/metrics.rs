use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{DoraError, Result};
use crate::model::github::WorkflowRun;

pub fn deployments(runs: Vec<WorkflowRun>) -> Vec<WorkflowRun> {
    runs.into_iter().filter(WorkflowRun::succeeded).collect()
}

pub fn deployment_frequency(
    deployments: &[WorkflowRun],
    now: DateTime<Utc>,
    window: Duration,
) -> Result<u64> {
    let window = chrono::Duration::from_std(window)
        .map_err(|e| DoraError::InvalidArgument(format!("frequency window out of range: {e}")))?;
    let since = now - window;
    Ok(deployments.iter().filter(|d| d.created_at > since).count() as u64)
}

pub fn lead_time_hours(merged_at: DateTime<Utc>, deployed_at: DateTime<Utc>) -> f64 {
    (deployed_at - merged_at).num_seconds() as f64 / 3600.0
}

pub fn average_lead_time(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    round2(samples.iter().sum::<f64>() / samples.len() as f64)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
