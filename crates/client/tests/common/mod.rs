//! Shared test harness: a scripted stub backend.
//!
//! Serves the three-endpoint job contract on an ephemeral port. Each
//! test scripts the sequence of status replies for one job; the final
//! entry repeats forever, matching the real backend's idempotent
//! terminal statuses. Poll and submit counters let tests assert that
//! polling stops exactly when it should.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use copydesk_core::policy::PollPolicy;

/// One scripted reply from the status endpoint.
#[derive(Debug, Clone)]
pub enum StatusReply {
    /// HTTP 404 -- the job id is not (yet) visible.
    NotFound,
    /// HTTP 502 -- the status endpoint is having a bad day.
    ServerError,
    Processing { stage: Option<u32> },
    Completed { result: serde_json::Value },
    Failed { error: String },
    /// Respond `completed` only after holding the request open, to
    /// exercise cancellation with a call in flight.
    DelayedCompleted {
        delay: Duration,
        result: serde_json::Value,
    },
}

/// Shared state behind the stub's handlers.
#[derive(Clone)]
pub struct StubBackend {
    pub job_id: String,
    script: Arc<Vec<StatusReply>>,
    /// Total status queries received, including ones for unknown ids.
    pub polls: Arc<AtomicUsize>,
    /// Total creation calls received.
    pub submits: Arc<AtomicUsize>,
    /// When set, the creation endpoint rejects with this status/detail.
    submit_rejection: Option<(u16, String)>,
}

impl StubBackend {
    pub fn new(job_id: &str, script: Vec<StatusReply>) -> Self {
        assert!(!script.is_empty(), "script must have at least one reply");
        Self {
            job_id: job_id.to_string(),
            script: Arc::new(script),
            polls: Arc::new(AtomicUsize::new(0)),
            submits: Arc::new(AtomicUsize::new(0)),
            submit_rejection: None,
        }
    }

    /// A backend whose creation endpoint rejects every submission.
    pub fn rejecting_submissions(status: u16, detail: &str) -> Self {
        let mut stub = Self::new("unused", vec![StatusReply::NotFound]);
        stub.submit_rejection = Some((status, detail.to_string()));
        stub
    }

    pub fn poll_count(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }

    pub fn submit_count(&self) -> usize {
        self.submits.load(Ordering::SeqCst)
    }

    /// Bind the stub to an ephemeral port and serve it in the
    /// background. Returns the base URL.
    pub async fn serve(&self) -> String {
        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/rewrite", post(submit))
            .route("/api/rewrite/status/{job_id}", get(status))
            .route("/api/articles/generate", post(submit))
            .route("/api/articles/generate/status/{job_id}", get(status))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("stub local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve stub backend");
        });
        format!("http://{addr}")
    }
}

/// A poll policy fast enough for tests: the cadence semantics are what
/// matters, not the production intervals.
pub fn fast_policy() -> PollPolicy {
    PollPolicy {
        initial_delay: Duration::from_millis(10),
        poll_interval: Duration::from_millis(20),
        miss_threshold: 3,
        max_ticks: 40,
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

async fn submit(State(stub): State<StubBackend>) -> Response {
    stub.submits.fetch_add(1, Ordering::SeqCst);
    if let Some((code, detail)) = &stub.submit_rejection {
        let status = StatusCode::from_u16(*code).expect("valid rejection status");
        return (status, Json(json!({"detail": detail}))).into_response();
    }
    Json(json!({"job_id": stub.job_id, "status": "queued"})).into_response()
}

async fn status(State(stub): State<StubBackend>, Path(job_id): Path<String>) -> Response {
    let attempt = stub.polls.fetch_add(1, Ordering::SeqCst);
    if job_id != stub.job_id {
        return (StatusCode::NOT_FOUND, Json(json!({"detail": "Job not found"}))).into_response();
    }

    let reply = stub.script[attempt.min(stub.script.len() - 1)].clone();
    match reply {
        StatusReply::NotFound => {
            (StatusCode::NOT_FOUND, Json(json!({"detail": "Job not found"}))).into_response()
        }
        StatusReply::ServerError => (
            StatusCode::BAD_GATEWAY,
            Json(json!({"error": "upstream unavailable"})),
        )
            .into_response(),
        StatusReply::Processing { stage } => {
            let mut body = json!({"status": "processing"});
            if let Some(stage) = stage {
                body["stage"] = json!(stage);
            }
            Json(body).into_response()
        }
        StatusReply::Completed { result } => {
            Json(json!({"status": "completed", "result": result})).into_response()
        }
        StatusReply::Failed { error } => {
            Json(json!({"status": "failed", "error": error})).into_response()
        }
        StatusReply::DelayedCompleted { delay, result } => {
            tokio::time::sleep(delay).await;
            Json(json!({"status": "completed", "result": result})).into_response()
        }
    }
}
