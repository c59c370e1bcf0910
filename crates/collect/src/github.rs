use std::time::Duration;

use dora_core::error::{DoraError, Result};
use dora_core::model::github::{PullRequest, WorkflowRun, WorkflowRunsPage};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

const RUNS_ACCEPT: &str = "application/vnd.github+json";
// Commit-to-PR lookups were gated behind this preview media type.
const PULLS_ACCEPT: &str = "application/vnd.github.groot-preview+json";

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub api_url: String,
    pub repository: String,
    pub token: String,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    repository: String,
}

impl GitHubClient {
    pub fn new(cfg: &GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", cfg.token))
            .map_err(|_| DoraError::Config("GitHub token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("dora/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(cfg.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| DoraError::Config(format!("failed to build GitHub client: {e}")))?;

        Ok(Self {
            client,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            repository: cfg.repository.clone(),
        })
    }

    pub async fn workflow_runs(&self, branch: &str, per_page: u32) -> Result<Vec<WorkflowRun>> {
        let url = format!("{}/repos/{}/actions/runs", self.api_url, self.repository);
        let page: WorkflowRunsPage = self
            .get_json(
                &url,
                RUNS_ACCEPT,
                &[("branch", branch.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        tracing::debug!(
            total = page.total_count,
            returned = page.workflow_runs.len(),
            "fetched workflow runs"
        );
        Ok(page.workflow_runs)
    }

    pub async fn pulls_for_commit(&self, sha: &str) -> Result<Vec<PullRequest>> {
        let url = format!(
            "{}/repos/{}/commits/{sha}/pulls",
            self.api_url, self.repository
        );
        self.get_json(&url, PULLS_ACCEPT, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        accept: &'static str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .header(ACCEPT, accept)
            .query(query)
            .send()
            .await
            .map_err(|e| DoraError::Fetch(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DoraError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| DoraError::Decode(format!("unexpected response from {url}: {e}")))
    }
}
