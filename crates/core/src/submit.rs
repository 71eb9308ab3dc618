//! Payload submission to the remote endpoint
//!
//! A submission is a single POST. Every failure is folded into a
//! `SubmissionResult`; nothing is retried.

use crate::config::ScannerConfig;
use crate::error::Result;
use crate::types::{SubmissionResult, SubmitRequest, SubmitResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

/// Forwards a decoded payload and reports how it went
#[async_trait]
pub trait Submitter: Send + Sync + 'static {
    /// Never returns `SubmissionResult::Pending`
    async fn submit(&self, payload: &str) -> SubmissionResult;
}

/// JSON-over-HTTP submitter
#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: Client,
    endpoint: Url,
}

impl HttpSubmitter {
    pub fn new(config: &ScannerConfig) -> Result<Self> {
        let endpoint = config.endpoint_url()?;
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, payload: &str) -> SubmissionResult {
        debug!("POST {} ({} bytes of payload)", self.endpoint, payload.len());

        let response = match self
            .client
            .post(self.endpoint.clone())
            .json(&SubmitRequest::new(payload))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Submission to {} failed: {}", self.endpoint, e);
                return SubmissionResult::network_failure(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Endpoint {} answered {}", self.endpoint, status);
            return SubmissionResult::server_error(status.as_u16());
        }

        match response.json::<SubmitResponse>().await {
            Ok(body) => {
                let echoed = body.echoed_or(payload);
                info!("Submission accepted ({})", status);
                SubmissionResult::Succeeded { echoed }
            }
            Err(e) => {
                warn!("Unreadable response from {}: {}", self.endpoint, e);
                SubmissionResult::network_failure(e.to_string())
            }
        }
    }
}

/// Scripted submitter for testing
///
/// Returns queued results in order, then echoes the payload back as a
/// success. When gated, each submission waits for a `release`.
pub struct MockSubmitter {
    results: Mutex<VecDeque<SubmissionResult>>,
    payloads: Arc<Mutex<Vec<String>>>,
    gate: Option<Semaphore>,
}

impl MockSubmitter {
    /// Echo every payload back as a success
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            payloads: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Hold every result until `release` is called
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::new()
        }
    }

    /// Queue the result for the next submission
    pub fn push_result(&self, result: SubmissionResult) {
        self.results
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(result);
    }

    /// Let `count` held submissions complete
    pub fn release(&self, count: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(count);
        }
    }

    /// Payloads submitted so far, in order
    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl Default for MockSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Submitter for MockSubmitter {
    async fn submit(&self, payload: &str) -> SubmissionResult {
        self.payloads
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(payload.to_string());

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let scripted = self
            .results
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front();
        scripted.unwrap_or_else(|| SubmissionResult::Succeeded {
            echoed: payload.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureKind;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn spawn_endpoint(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/posts", addr)
    }

    fn submitter_for(endpoint: &str) -> HttpSubmitter {
        let config = ScannerConfig::with_endpoint(endpoint).with_timeout(Duration::from_secs(2));
        HttpSubmitter::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_success_echoes_body() {
        let (tx, rx) = tokio::sync::oneshot::channel::<Value>();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let app = Router::new().route(
            "/posts",
            post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    if let Some(tx) = tx.lock().unwrap().take() {
                        let _ = tx.send(body.clone());
                    }
                    let mut echoed = body;
                    echoed["id"] = json!(101);
                    (StatusCode::CREATED, Json(echoed))
                }
            }),
        );
        let endpoint = spawn_endpoint(app).await;

        let result = submitter_for(&endpoint).submit("ABC123").await;

        assert_eq!(
            result,
            SubmissionResult::Succeeded {
                echoed: "ABC123".to_string()
            }
        );
        assert_eq!(result.status_message(), "Success: ABC123");
        assert_eq!(rx.await.unwrap(), json!({"scannedData": "ABC123"}));
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let app = Router::new().route(
            "/posts",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let endpoint = spawn_endpoint(app).await;

        let result = submitter_for(&endpoint).submit("ABC123").await;

        assert_eq!(result, SubmissionResult::server_error(500));
        assert_eq!(result.status_message(), "Error sending data to the server.");
    }

    #[tokio::test]
    async fn test_unreadable_body_is_network_failure() {
        let app = Router::new().route("/posts", post(|| async { "not json" }));
        let endpoint = spawn_endpoint(app).await;

        let result = submitter_for(&endpoint).submit("ABC123").await;

        assert!(matches!(
            result,
            SubmissionResult::Failed(FailureKind::NetworkFailure { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = submitter_for(&format!("http://{}/posts", addr))
            .submit("ABC123")
            .await;

        assert_eq!(result.status_message(), "Error: Unable to send data.");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = ScannerConfig::with_endpoint("mailto:scanner@example.com");
        assert!(HttpSubmitter::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_mock_scripted_then_echo() {
        let mock = MockSubmitter::new();
        mock.push_result(SubmissionResult::server_error(503));

        assert_eq!(mock.submit("one").await, SubmissionResult::server_error(503));
        assert_eq!(
            mock.submit("two").await,
            SubmissionResult::Succeeded {
                echoed: "two".to_string()
            }
        );
        assert_eq!(mock.payloads(), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn test_mock_gate_holds_result() {
        let mock = Arc::new(MockSubmitter::gated());
        let task = {
            let mock = mock.clone();
            tokio::spawn(async move { mock.submit("held").await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());
        assert_eq!(mock.payloads(), vec!["held"]);

        mock.release(1);
        assert_eq!(
            task.await.unwrap(),
            SubmissionResult::Succeeded {
                echoed: "held".to_string()
            }
        );
    }
}
