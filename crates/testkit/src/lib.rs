use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: body.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub accept: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct MockState {
    routes: HashMap<String, MockResponse>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    state: Arc<MockState>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn start<P: Into<String>>(routes: impl IntoIterator<Item = (P, MockResponse)>) -> Self {
        let state = Arc::new(MockState {
            routes: routes
                .into_iter()
                .map(|(path, resp)| (path.into(), resp))
                .collect(),
            requests: Mutex::new(Vec::new()),
        });
        let router = Router::new().fallback(respond).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server addr");
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self { addr, state, task }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests lock").clone()
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn respond(State(state): State<Arc<MockState>>, req: Request) -> Response {
    let header_str = |name: header::HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        accept: header_str(header::ACCEPT),
        authorization: header_str(header::AUTHORIZATION),
    };
    let route = state.routes.get(&recorded.path).cloned();
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(recorded);

    match route {
        Some(resp) => (
            StatusCode::from_u16(resp.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            [(header::CONTENT_TYPE, resp.content_type)],
            resp.body,
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[derive(Clone, Default)]
pub struct ErrorCounter(Arc<AtomicUsize>);

impl ErrorCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub fn metrics_payload(frequency: u64, lead_time_hours: f64) -> Value {
    json!({
        "timestamp": "2026-02-01T00:00:00Z",
        "deployment_frequency": frequency,
        "average_lead_time_hours": lead_time_hours,
    })
}

fn github_time(ts: DateTime<Utc>) -> String {
    dora_core::time::format_timestamp(ts)
}

pub fn sample_runs(now: DateTime<Utc>) -> Value {
    json!({
        "total_count": 4,
        "workflow_runs": [
            {
                "id": 1,
                "head_sha": "aaa111",
                "conclusion": "success",
                "created_at": github_time(now - Duration::hours(2)),
            },
            {
                "id": 2,
                "head_sha": "bbb222",
                "conclusion": "failure",
                "created_at": github_time(now - Duration::hours(3)),
            },
            {
                "id": 3,
                "head_sha": "ccc333",
                "conclusion": "success",
                "created_at": github_time(now - Duration::days(2)),
            },
            {
                "id": 4,
                "head_sha": "ddd444",
                "conclusion": "success",
                "created_at": github_time(now - Duration::days(20)),
            }
        ]
    })
}

pub fn sample_pulls(now: DateTime<Utc>) -> Vec<(String, Value)> {
    vec![
        (
            "aaa111".to_string(),
            json!([{ "number": 10, "merged_at": github_time(now - Duration::hours(3)) }]),
        ),
        (
            "ccc333".to_string(),
            json!([{ "number": 11, "merged_at": github_time(now - Duration::days(2) - Duration::hours(4)) }]),
        ),
        (
            "ddd444".to_string(),
            json!([{ "number": 12, "merged_at": null }]),
        ),
    ]
}

pub fn github_routes(repo: &str, now: DateTime<Utc>) -> Vec<(String, MockResponse)> {
    let mut routes = vec![(
        format!("/repos/{repo}/actions/runs"),
        MockResponse::json(sample_runs(now)),
    )];
    for (sha, pulls) in sample_pulls(now) {
        routes.push((
            format!("/repos/{repo}/commits/{sha}/pulls"),
            MockResponse::json(pulls),
        ));
    }
    routes
}
