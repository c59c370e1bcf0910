use std::time::Duration;

use chrono::{TimeZone, Utc};
use dora_collect::collector::{CollectConfig, Collector};
use dora_collect::github::{GitHubClient, GitHubConfig};
use dora_core::error::DoraError;
use dora_core::history::{WriteMode, load_history};
use testkit::{MockResponse, MockServer, github_routes};

const REPO: &str = "octo/app";

fn collector(server: &MockServer) -> Collector {
    let client = GitHubClient::new(&GitHubConfig {
        api_url: server.url(),
        repository: REPO.to_string(),
        token: "test-token".to_string(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    Collector::new(
        client,
        CollectConfig {
            branch: "main".to_string(),
            per_page: 100,
            frequency_window: Duration::from_secs(7 * 86_400),
        },
    )
}

#[tokio::test]
async fn computes_frequency_and_lead_time_from_runs() {
    let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
    let server = MockServer::start(github_routes(REPO, now)).await;

    let entry = collector(&server).collect(now).await.unwrap();

    assert_eq!(entry.deployment_frequency, 2);
    assert_eq!(entry.average_lead_time_hours, 2.5);
    assert_eq!(entry.timestamp, now);
}

#[tokio::test]
async fn sends_auth_and_media_type_headers() {
    let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
    let server = MockServer::start(github_routes(REPO, now)).await;

    collector(&server).collect(now).await.unwrap();

    let requests = server.requests();
    let runs = requests
        .iter()
        .find(|r| r.path == "/repos/octo/app/actions/runs")
        .unwrap();
    assert_eq!(runs.authorization.as_deref(), Some("Bearer test-token"));
    assert_eq!(runs.accept.as_deref(), Some("application/vnd.github+json"));
    let query = runs.query.as_deref().unwrap();
    assert!(query.contains("branch=main"));
    assert!(query.contains("per_page=100"));

    let pulls: Vec<_> = requests
        .iter()
        .filter(|r| r.path.ends_with("/pulls"))
        .collect();
    assert_eq!(pulls.len(), 3);
    assert!(pulls.iter().all(|r| {
        r.accept.as_deref() == Some("application/vnd.github.groot-preview+json")
    }));
    assert_eq!(server.hits("/repos/octo/app/commits/bbb222/pulls"), 0);
}

#[tokio::test]
async fn unauthorized_runs_request_fails() {
    let server = MockServer::start([(
        "/repos/octo/app/actions/runs",
        MockResponse::text(401, "Bad credentials"),
    )])
    .await;

    let err = collector(&server).collect(Utc::now()).await.unwrap_err();
    assert!(matches!(err, DoraError::Status { status: 401, .. }));
}

#[tokio::test]
async fn no_runs_yields_zeroes() {
    let server = MockServer::start([(
        "/repos/octo/app/actions/runs",
        MockResponse::json(serde_json::json!({ "total_count": 0 })),
    )])
    .await;

    let entry = collector(&server).collect(Utc::now()).await.unwrap();
    assert_eq!(entry.deployment_frequency, 0);
    assert_eq!(entry.average_lead_time_hours, 0.0);
}

#[tokio::test]
async fn collect_into_appends_history() {
    let now = Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap();
    let server = MockServer::start(github_routes(REPO, now)).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dora_metrics.json");

    let collector = collector(&server);
    collector
        .collect_into(&path, WriteMode::Append, now)
        .await
        .unwrap();
    collector
        .collect_into(&path, WriteMode::Append, now)
        .await
        .unwrap();

    let history = load_history(&path);
    assert_eq!(history.len(), 2);
    assert_eq!(history[1]["average_lead_time_hours"], serde_json::json!(2.5));
}
