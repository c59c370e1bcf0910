use std::time::Duration;

use dora_core::error::{DoraError, Result};
use dora_render::{
    BarChart, ChartRenderer, LoadState, MetricsSource, RenderTarget, SvgRenderer, load_and_render,
};
use serde_json::json;
use testkit::{ErrorCounter, MockResponse, MockServer, metrics_payload};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Default)]
struct RecordingRenderer {
    calls: Vec<(String, BarChart)>,
}

impl ChartRenderer for RecordingRenderer {
    fn render(&mut self, canvas_id: &str, chart: &BarChart) -> Result<()> {
        self.calls.push((canvas_id.to_string(), chart.clone()));
        Ok(())
    }
}

struct MissingCanvas;

impl ChartRenderer for MissingCanvas {
    fn render(&mut self, canvas_id: &str, _chart: &BarChart) -> Result<()> {
        Err(DoraError::Render(format!("canvas #{canvas_id} not found")))
    }
}

fn http_source(server: &MockServer) -> MetricsSource {
    MetricsSource::from_location(&server.url(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn renders_snapshot_values_and_labels() {
    let server = MockServer::start([(
        "/dora_metrics.json",
        MockResponse::json(json!({"deployment_frequency": 5, "average_lead_time_hours": 12.5})),
    )])
    .await;
    let mut renderer = RecordingRenderer::default();

    let state = load_and_render(&http_source(&server), &RenderTarget::default(), &mut renderer).await;

    assert_eq!(state, LoadState::Rendered);
    assert_eq!(server.hits("/dora_metrics.json"), 1);
    assert_eq!(renderer.calls.len(), 1);
    let (canvas, chart) = &renderer.calls[0];
    assert_eq!(canvas, "doraChart");
    assert_eq!(chart.labels, vec!["Deployment Frequency", "Lead Time (hrs)"]);
    assert_eq!(chart.datasets[0].data, vec![Some(json!(5)), Some(json!(12.5))]);
}

#[tokio::test]
async fn http_error_status_logs_once_and_skips_render() {
    let server = MockServer::start([(
        "/dora_metrics.json",
        MockResponse::text(503, "unavailable"),
    )])
    .await;
    let errors = ErrorCounter::default();
    let _guard = tracing_subscriber::registry()
        .with(errors.clone())
        .set_default();
    let mut renderer = RecordingRenderer::default();

    let state = load_and_render(&http_source(&server), &RenderTarget::default(), &mut renderer).await;

    assert_eq!(state, LoadState::Failed);
    assert!(renderer.calls.is_empty());
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn malformed_json_logs_once_and_skips_render() {
    let server = MockServer::start([(
        "/dora_metrics.json",
        MockResponse::text(200, "<html>oops</html>"),
    )])
    .await;
    let errors = ErrorCounter::default();
    let _guard = tracing_subscriber::registry()
        .with(errors.clone())
        .set_default();
    let mut renderer = RecordingRenderer::default();

    let state = load_and_render(&http_source(&server), &RenderTarget::default(), &mut renderer).await;

    assert_eq!(state, LoadState::Failed);
    assert!(renderer.calls.is_empty());
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn network_failure_logs_once() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let source =
        MetricsSource::from_location(&format!("http://127.0.0.1:{port}/"), Duration::from_secs(5))
            .unwrap();

    let errors = ErrorCounter::default();
    let _guard = tracing_subscriber::registry()
        .with(errors.clone())
        .set_default();
    let mut renderer = RecordingRenderer::default();

    let state = load_and_render(&source, &RenderTarget::default(), &mut renderer).await;

    assert_eq!(state, LoadState::Failed);
    assert!(renderer.calls.is_empty());
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn missing_field_is_passed_through_as_absent() {
    let server = MockServer::start([(
        "/dora_metrics.json",
        MockResponse::json(json!({"deployment_frequency": 3})),
    )])
    .await;
    let mut renderer = RecordingRenderer::default();

    let state = load_and_render(&http_source(&server), &RenderTarget::default(), &mut renderer).await;

    assert_eq!(state, LoadState::Rendered);
    assert_eq!(renderer.calls[0].1.datasets[0].data, vec![Some(json!(3)), None]);
}

#[tokio::test]
async fn repeated_loads_render_independently() {
    let server = MockServer::start([(
        "/dora_metrics.json",
        MockResponse::json(metrics_payload(4, 6.25)),
    )])
    .await;
    let source = http_source(&server);
    let mut renderer = RecordingRenderer::default();

    let first = load_and_render(&source, &RenderTarget::default(), &mut renderer).await;
    let second = load_and_render(&source, &RenderTarget::default(), &mut renderer).await;

    assert_eq!((first, second), (LoadState::Rendered, LoadState::Rendered));
    assert_eq!(server.hits("/dora_metrics.json"), 2);
    assert_eq!(renderer.calls.len(), 2);
    assert_eq!(renderer.calls[0], renderer.calls[1]);
}

#[tokio::test]
async fn missing_canvas_logs_once() {
    let server = MockServer::start([(
        "/dora_metrics.json",
        MockResponse::json(metrics_payload(1, 1.0)),
    )])
    .await;
    let errors = ErrorCounter::default();
    let _guard = tracing_subscriber::registry()
        .with(errors.clone())
        .set_default();

    let state = load_and_render(&http_source(&server), &RenderTarget::default(), &mut MissingCanvas).await;

    assert_eq!(state, LoadState::Failed);
    assert_eq!(errors.count(), 1);
}

#[tokio::test]
async fn directory_source_writes_svg_canvas() -> anyhow::Result<()> {
    let site = tempfile::tempdir()?;
    std::fs::write(
        site.path().join("dora_metrics.json"),
        serde_json::to_vec(&json!([metrics_payload(1, 2.0), metrics_payload(9, 3.5)]))?,
    )?;
    let source = MetricsSource::from_location(&site.path().display().to_string(), Duration::from_secs(1))?;
    let mut renderer = SvgRenderer::new(site.path(), 640, 320);

    let state = load_and_render(&source, &RenderTarget::default(), &mut renderer).await;

    assert_eq!(state, LoadState::Rendered);
    let svg = std::fs::read_to_string(renderer.canvas_path("doraChart"))?;
    assert!(svg.contains("Latest DORA Metrics"));
    Ok(())
}
