use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use dora_core::error::Result;
use dora_core::history::{WriteMode, write_entry};
use dora_core::metrics;
use dora_core::model::entry::MetricsEntry;
use dora_core::model::github::WorkflowRun;

use crate::github::GitHubClient;

#[derive(Debug, Clone)]
pub struct CollectConfig {
    pub branch: String,
    pub per_page: u32,
    pub frequency_window: Duration,
}

pub struct Collector {
    client: GitHubClient,
    cfg: CollectConfig,
}

impl Collector {
    pub fn new(client: GitHubClient, cfg: CollectConfig) -> Self {
        Self { client, cfg }
    }

    pub async fn collect(&self, now: DateTime<Utc>) -> Result<MetricsEntry> {
        let runs = self
            .client
            .workflow_runs(&self.cfg.branch, self.cfg.per_page)
            .await?;
        let deployments = metrics::deployments(runs);
        let frequency =
            metrics::deployment_frequency(&deployments, now, self.cfg.frequency_window)?;
        let lead_time = self.average_lead_time(&deployments).await?;

        tracing::info!(
            branch = %self.cfg.branch,
            deployments = deployments.len(),
            frequency,
            lead_time_hours = lead_time,
            "collected DORA metrics"
        );

        Ok(MetricsEntry {
            timestamp: now.trunc_subsecs(0),
            deployment_frequency: frequency,
            average_lead_time_hours: lead_time,
        })
    }

    pub async fn collect_into(
        &self,
        path: &Path,
        mode: WriteMode,
        now: DateTime<Utc>,
    ) -> Result<MetricsEntry> {
        let entry = self.collect(now).await?;
        write_entry(path, &entry, mode)?;
        tracing::info!(path = %path.display(), ?mode, "metrics file written");
        Ok(entry)
    }

    async fn average_lead_time(&self, deployments: &[WorkflowRun]) -> Result<f64> {
        let mut samples = Vec::new();
        for deployment in deployments {
            let pulls = self.client.pulls_for_commit(&deployment.head_sha).await?;
            let Some(merged_at) = pulls.first().and_then(|pr| pr.merged_at) else {
                tracing::debug!(sha = %deployment.head_sha, "deployment has no merged pull request");
                continue;
            };
            samples.push(metrics::lead_time_hours(merged_at, deployment.created_at));
        }
        Ok(metrics::average_lead_time(&samples))
    }
}
