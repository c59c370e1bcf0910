use dora_core::config::Config;
use dora_core::error::Result;
use serde::Serialize;

use crate::chart::BarChart;
use crate::source::MetricsSource;
use crate::svg::ChartRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Pending,
    Rendered,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub resource: String,
    pub canvas_id: String,
}

impl RenderTarget {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            resource: cfg.metrics_file.clone(),
            canvas_id: cfg.canvas_id.clone(),
        }
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self {
            resource: dora_core::METRICS_FILE.to_string(),
            canvas_id: dora_core::CANVAS_ID.to_string(),
        }
    }
}

pub async fn load_and_render<R>(
    source: &MetricsSource,
    target: &RenderTarget,
    renderer: &mut R,
) -> LoadState
where
    R: ChartRenderer + ?Sized,
{
    match try_load_and_render(source, target, renderer).await {
        Ok(()) => {
            tracing::info!(canvas = %target.canvas_id, "metrics chart rendered");
            LoadState::Rendered
        }
        Err(err) => {
            tracing::error!(
                resource = %source.describe(&target.resource),
                error = %err,
                "failed to load metrics"
            );
            LoadState::Failed
        }
    }
}

async fn try_load_and_render<R>(
    source: &MetricsSource,
    target: &RenderTarget,
    renderer: &mut R,
) -> Result<()>
where
    R: ChartRenderer + ?Sized,
{
    let snapshot = source.load_snapshot(&target.resource).await?;
    let chart = BarChart::from_snapshot(&snapshot);
    renderer.render(&target.canvas_id, &chart)
}
