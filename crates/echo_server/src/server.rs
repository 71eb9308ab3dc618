//! Development endpoint for scanned payloads
//!
//! Mirrors the placeholder API the scanner posts to by default: `POST /posts`
//! answers 201 with the posted object plus an `id`, `GET /posts` lists the
//! most recent `RECEIVED_LIMIT` posts. Can be told to fail every POST with a
//! fixed status.

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Posts kept for `GET /posts`; older ones are discarded
pub const RECEIVED_LIMIT: usize = 100;

/// State shared across handlers
#[derive(Clone)]
pub struct EchoState {
    next_id: Arc<AtomicU64>,
    fail_status: Option<StatusCode>,
    received: Arc<Mutex<VecDeque<Value>>>,
}

impl EchoState {
    pub fn new(fail_status: Option<StatusCode>) -> Self {
        Self {
            next_id: Arc::new(AtomicU64::new(101)),
            fail_status,
            received: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Most recent posts, oldest first
    pub async fn received(&self) -> Vec<Value> {
        self.received.lock().await.iter().cloned().collect()
    }

    async fn record(&self, post: Value) {
        let mut received = self.received.lock().await;
        if received.len() == RECEIVED_LIMIT {
            received.pop_front();
        }
        received.push_back(post);
    }
}

/// `POST /posts`
pub async fn create_post(State(state): State<EchoState>, Json(body): Json<Value>) -> Response {
    if let Some(status) = state.fail_status {
        warn!("Rejecting post with {}", status);
        return (status, Json(json!({ "error": "configured failure" }))).into_response();
    }

    let Value::Object(mut post) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "expected a JSON object" })),
        )
            .into_response();
    };

    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    post.insert("id".to_string(), json!(id));
    match post.get("scannedData") {
        Some(data) => info!("Post {}: scannedData = {}", id, data),
        None => info!("Post {} without scannedData", id),
    }

    let post = Value::Object(post);
    state.record(post.clone()).await;
    (StatusCode::CREATED, Json(post)).into_response()
}

/// `GET /posts`
pub async fn list_posts(State(state): State<EchoState>) -> Json<Vec<Value>> {
    Json(state.received().await)
}

pub fn router(state: EchoState) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Echo endpoint server
pub struct EchoServer {
    state: EchoState,
}

impl EchoServer {
    pub fn new(fail_status: Option<StatusCode>) -> Self {
        Self {
            state: EchoState::new(fail_status),
        }
    }

    /// Get the state for inspection
    pub fn state(&self) -> EchoState {
        self.state.clone()
    }

    /// Bind and serve in the background; returns the bound address
    pub async fn start(&self, bind: SocketAddr) -> Result<(SocketAddr, JoinHandle<()>)> {
        let listener = tokio::net::TcpListener::bind(bind)
            .await
            .with_context(|| format!("Failed to bind {}", bind))?;
        let addr = listener.local_addr()?;
        let app = router(self.state.clone());

        info!("Echo endpoint listening on http://{}/posts", addr);
        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                warn!("Echo server stopped: {}", e);
            }
        });

        Ok((addr, task))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanpost_core::{HttpSubmitter, ScannerConfig, SubmissionResult, Submitter};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_post_echoes_with_id() {
        let state = EchoState::new(None);

        let response = create_post(State(state.clone()), Json(json!({"scannedData": "ABC123"}))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await, json!({"scannedData": "ABC123", "id": 101}));

        let response = create_post(State(state.clone()), Json(json!({"scannedData": "XYZ789"}))).await;
        assert_eq!(body_json(response).await["id"], json!(102));
        assert_eq!(state.received().await.len(), 2);
    }

    #[tokio::test]
    async fn test_received_keeps_latest_posts() {
        let state = EchoState::new(None);
        for n in 0..RECEIVED_LIMIT + 5 {
            create_post(State(state.clone()), Json(json!({ "scannedData": n.to_string() }))).await;
        }

        let received = state.received().await;
        assert_eq!(received.len(), RECEIVED_LIMIT);
        assert_eq!(received[0]["scannedData"], json!("5"));
        assert_eq!(
            received[RECEIVED_LIMIT - 1]["scannedData"],
            json!((RECEIVED_LIMIT + 4).to_string())
        );
    }

    #[tokio::test]
    async fn test_create_post_rejects_non_object() {
        let state = EchoState::new(None);
        let response = create_post(State(state.clone()), Json(json!(["ABC123"]))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let state = EchoState::new(Some(StatusCode::SERVICE_UNAVAILABLE));
        let response = create_post(State(state.clone()), Json(json!({"scannedData": "x"}))).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.received().await.is_empty());
    }

    #[tokio::test]
    async fn test_scanner_client_against_server() {
        let server = EchoServer::new(None);
        let (addr, _task) = server.start("127.0.0.1:0".parse().unwrap()).await.unwrap();

        let config = ScannerConfig::with_endpoint(format!("http://{}/posts", addr));
        let submitter = HttpSubmitter::new(&config).unwrap();
        let result = submitter.submit("ABC123").await;

        assert_eq!(
            result,
            SubmissionResult::Succeeded {
                echoed: "ABC123".to_string()
            }
        );
        let received = server.state().received().await;
        assert_eq!(received, vec![json!({"scannedData": "ABC123", "id": 101})]);
    }

    #[tokio::test]
    async fn test_scanner_client_sees_failure_status() {
        let server = EchoServer::new(Some(StatusCode::INTERNAL_SERVER_ERROR));
        let (addr, _task) = server.start("127.0.0.1:0".parse().unwrap()).await.unwrap();

        let config = ScannerConfig::with_endpoint(format!("http://{}/posts", addr));
        let result = HttpSubmitter::new(&config).unwrap().submit("ABC123").await;

        assert_eq!(result.status_message(), "Error sending data to the server.");
    }
}
