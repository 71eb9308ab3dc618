//! Scanner configuration

use crate::error::{CoreError, Result};
use crate::types::{FacingDirection, Symbology};
use std::time::Duration;
use url::Url;

/// Placeholder endpoint that echoes the posted JSON back
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Endpoint receiving `POST {"scannedData": ...}`
    pub endpoint: String,

    /// Upper bound for one submission, connect included
    pub request_timeout: Duration,

    /// Camera used when the screen opens
    pub initial_facing: FacingDirection,

    /// Formats enabled on the camera
    pub symbologies: Vec<Symbology>,

    /// Controller event queue capacity
    pub event_capacity: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: Duration::from_secs(10),
            initial_facing: FacingDirection::Back,
            symbologies: Symbology::SUPPORTED.to_vec(),
            event_capacity: 64,
        }
    }
}

impl ScannerConfig {
    /// Create with custom endpoint
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_facing(mut self, facing: FacingDirection) -> Self {
        self.initial_facing = facing;
        self
    }

    pub fn with_symbologies(mut self, symbologies: Vec<Symbology>) -> Self {
        self.symbologies = symbologies;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Parse and check the endpoint (http or https only)
    pub fn endpoint_url(&self) -> Result<Url> {
        let invalid = |reason: String| CoreError::InvalidEndpoint {
            endpoint: self.endpoint.clone(),
            reason,
        };
        let url = Url::parse(&self.endpoint).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(invalid(format!("unsupported scheme '{}'", other))),
        }
    }
}
