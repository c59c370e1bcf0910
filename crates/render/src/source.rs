use std::path::PathBuf;
use std::time::Duration;

use dora_core::error::{DoraError, Result};
use dora_core::model::snapshot::MetricsSnapshot;
use reqwest::{Client, Url};

#[derive(Debug, Clone)]
pub enum MetricsSource {
    Http { client: Client, base: Url },
    Dir(PathBuf),
}

impl MetricsSource {
    pub fn from_location(location: &str, timeout: Duration) -> Result<Self> {
        if !(location.starts_with("http://") || location.starts_with("https://")) {
            return Ok(Self::Dir(PathBuf::from(location)));
        }

        let mut base = location.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base)
            .map_err(|e| DoraError::InvalidArgument(format!("bad source url {location}: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DoraError::Config(format!("failed to build http client: {e}")))?;
        Ok(Self::Http { client, base })
    }

    pub fn describe(&self, resource: &str) -> String {
        match self {
            Self::Http { base, .. } => base
                .join(resource)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| format!("{base}{resource}")),
            Self::Dir(dir) => dir.join(resource).display().to_string(),
        }
    }

    pub async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        match self {
            Self::Http { client, base } => {
                let url = base
                    .join(resource)
                    .map_err(|e| DoraError::InvalidArgument(format!("bad resource {resource}: {e}")))?;
                let resp = client
                    .get(url.clone())
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
                let body = resp
                    .bytes()
                    .await
                    .map_err(|e| DoraError::Fetch(format!("read body of {url}: {e}")))?;
                Ok(body.to_vec())
            }
            Self::Dir(dir) => {
                let path = dir.join(resource);
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| DoraError::Fetch(format!("read {}: {e}", path.display())))
            }
        }
    }

    pub async fn load_snapshot(&self, resource: &str) -> Result<MetricsSnapshot> {
        let body = self.fetch(resource).await?;
        MetricsSnapshot::parse(&body)
    }
}
