use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use dora_core::error::{DoraError, Result};
use dora_render::svg::render_svg;
use dora_render::{BarChart, ChartRenderer, LoadState, MetricsSource, RenderTarget, load_and_render};
use tower_http::trace::TraceLayer;

#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub dir: PathBuf,
    pub target: RenderTarget,
    pub width: u32,
    pub height: u32,
}

struct ServeState {
    cfg: ServeConfig,
    source: MetricsSource,
}

struct PageCanvas {
    canvas_id: String,
    width: u32,
    height: u32,
    svg: Option<String>,
}

impl ChartRenderer for PageCanvas {
    fn render(&mut self, canvas_id: &str, chart: &BarChart) -> Result<()> {
        if canvas_id != self.canvas_id {
            return Err(DoraError::Render(format!("canvas #{canvas_id} not found")));
        }
        self.svg = Some(render_svg(chart, self.width, self.height)?);
        Ok(())
    }
}

pub fn router(cfg: ServeConfig) -> Router {
    let metrics_route = format!("/{}", cfg.target.resource);
    let chart_route = format!("/{}.svg", cfg.target.canvas_id);
    let state = Arc::new(ServeState {
        source: MetricsSource::Dir(cfg.dir.clone()),
        cfg,
    });

    Router::new()
        .route("/", get(index))
        .route(&metrics_route, get(metrics_file))
        .route(&chart_route, get(chart))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(cfg: ServeConfig, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    tracing::info!(%addr, dir = %cfg.dir.display(), "serving metrics dashboard");
    axum::serve(listener, router(cfg))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received ctrl-c, shutting down");
        })
        .await
        .context("dashboard server failed")
}

async fn index(State(state): State<Arc<ServeState>>) -> Html<String> {
    let id = &state.cfg.target.canvas_id;
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>DORA Metrics</title></head>\n\
         <body>\n<h1>DORA Metrics</h1>\n<img id=\"{id}\" src=\"{id}.svg\" alt=\"DORA metrics chart\" style=\"max-width:100%\">\n</body>\n</html>\n"
    ))
}

async fn metrics_file(State(state): State<Arc<ServeState>>) -> Response {
    match state.source.fetch(&state.cfg.target.resource).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "metrics file unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn chart(State(state): State<Arc<ServeState>>) -> Response {
    let mut canvas = PageCanvas {
        canvas_id: state.cfg.target.canvas_id.clone(),
        width: state.cfg.width,
        height: state.cfg.height,
        svg: None,
    };
    match load_and_render(&state.source, &state.cfg.target, &mut canvas).await {
        LoadState::Rendered => match canvas.svg {
            Some(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        LoadState::Pending | LoadState::Failed => StatusCode::NOT_FOUND.into_response(),
    }
}
