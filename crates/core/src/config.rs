use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DoraError, Result};
use crate::history::WriteMode;
use crate::{CANVAS_ID, METRICS_FILE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub source: String,
    pub metrics_file: String,
    pub canvas_id: String,
    pub out_dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
    pub http_timeout: Duration,
    pub github_api_url: String,
    pub repository: Option<String>,
    pub branch: String,
    pub token_env: String,
    pub per_page: u32,
    pub frequency_window: Duration,
    pub write_mode: WriteMode,
    pub serve_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            metrics_file: METRICS_FILE.to_string(),
            canvas_id: CANVAS_ID.to_string(),
            out_dir: PathBuf::from("."),
            chart_width: 800,
            chart_height: 400,
            http_timeout: Duration::from_secs(10),
            github_api_url: "https://api.github.com".to_string(),
            repository: None,
            branch: "main".to_string(),
            token_env: "GH_PAT".to_string(),
            per_page: 100,
            frequency_window: Duration::from_secs(7 * 86_400),
            write_mode: WriteMode::Overwrite,
            serve_addr: "127.0.0.1:8000".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn github_token(&self) -> Result<String> {
        match env::var(&self.token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(DoraError::Config(format!(
                "GitHub token not found, set {}",
                self.token_env
            ))),
        }
    }

    pub fn require_repository(&self) -> Result<&str> {
        let repo = self
            .repository
            .as_deref()
            .ok_or_else(|| DoraError::Config("repository is not configured".to_string()))?;
        validate_repository(repo)?;
        Ok(repo)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    source: Option<String>,
    metrics_file: Option<String>,
    canvas_id: Option<String>,
    out_dir: Option<PathBuf>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    http_timeout: Option<String>,
    github_api_url: Option<String>,
    repository: Option<String>,
    branch: Option<String>,
    token_env: Option<String>,
    per_page: Option<u32>,
    frequency_window: Option<String>,
    write_mode: Option<String>,
    serve_addr: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("DORA_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("dora/config.toml")
}

fn load_file_overrides(path: &PathBuf) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| DoraError::Config(format!("failed reading {}: {e}", path.display())))?;
    parse_overrides(&raw)
        .map(Some)
        .map_err(|e| DoraError::Config(format!("failed parsing {}: {e}", path.display())))
}

fn parse_overrides(raw: &str) -> std::result::Result<ConfigOverrides, toml::de::Error> {
    toml::from_str(raw)
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let per_page = match env::var("DORA_PER_PAGE") {
        Ok(v) => Some(v.parse::<u32>().map_err(|e| {
            DoraError::Config(format!("bad DORA_PER_PAGE in environment: {e}"))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        source: env::var("DORA_SOURCE").ok(),
        metrics_file: None,
        canvas_id: None,
        out_dir: env::var("DORA_OUT_DIR").ok().map(PathBuf::from),
        chart_width: None,
        chart_height: None,
        http_timeout: env::var("DORA_HTTP_TIMEOUT").ok(),
        github_api_url: env::var("DORA_GITHUB_API_URL").ok(),
        repository: env::var("DORA_REPOSITORY").ok(),
        branch: env::var("DORA_BRANCH").ok(),
        token_env: env::var("DORA_TOKEN_ENV").ok(),
        per_page,
        frequency_window: env::var("DORA_FREQUENCY_WINDOW").ok(),
        write_mode: env::var("DORA_WRITE_MODE").ok(),
        serve_addr: env::var("DORA_SERVE_ADDR").ok(),
    })
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.source {
        cfg.source = v;
    }
    if let Some(v) = overrides.metrics_file {
        cfg.metrics_file = v;
    }
    if let Some(v) = overrides.canvas_id {
        cfg.canvas_id = v;
    }
    if let Some(v) = overrides.out_dir {
        cfg.out_dir = v;
    }
    if let Some(v) = overrides.chart_width {
        cfg.chart_width = v;
    }
    if let Some(v) = overrides.chart_height {
        cfg.chart_height = v;
    }
    if let Some(v) = overrides.http_timeout {
        cfg.http_timeout = humantime::parse_duration(&v).map_err(|e| {
            DoraError::Config(format!("bad http_timeout in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.github_api_url {
        cfg.github_api_url = v;
    }
    if let Some(v) = overrides.repository {
        validate_repository(&v).map_err(|e| {
            DoraError::Config(format!("bad repository in {source}: {e} (value={v})"))
        })?;
        cfg.repository = Some(v);
    }
    if let Some(v) = overrides.branch {
        cfg.branch = v;
    }
    if let Some(v) = overrides.token_env {
        cfg.token_env = v;
    }
    if let Some(v) = overrides.per_page {
        if v == 0 || v > 100 {
            return Err(DoraError::Config(format!(
                "bad per_page in {source}: must be within 1..=100 (value={v})"
            )));
        }
        cfg.per_page = v;
    }
    if let Some(v) = overrides.frequency_window {
        cfg.frequency_window = humantime::parse_duration(&v).map_err(|e| {
            DoraError::Config(format!(
                "bad frequency_window in {source}: {e} (value={v})"
            ))
        })?;
    }
    if let Some(v) = overrides.write_mode {
        cfg.write_mode = WriteMode::parse(&v)
            .map_err(|e| DoraError::Config(format!("bad write_mode in {source}: {e}")))?;
    }
    if let Some(v) = overrides.serve_addr {
        cfg.serve_addr = v;
    }
    Ok(())
}

pub fn validate_repository(repo: &str) -> Result<()> {
    let Some((owner, name)) = repo.split_once('/') else {
        return Err(DoraError::InvalidArgument(format!(
            "repository must use owner/name syntax, got {repo}"
        )));
    };
    if owner.trim().is_empty() || name.trim().is_empty() || name.contains('/') {
        return Err(DoraError::InvalidArgument(format!(
            "repository must use owner/name syntax, got {repo}"
        )));
    }
    Ok(())
}
