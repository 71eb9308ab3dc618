//! Error types for scanpost-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Camera permission denied")]
    PermissionDenied,

    #[error("Camera is not active")]
    CameraInactive,

    #[error("Unsupported symbology: {0}")]
    UnsupportedSymbology(String),

    #[error("Invalid facing direction: {0}")]
    InvalidFacing(String),

    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Scanner event loop closed")]
    ChannelClosed,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for CoreError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        CoreError::ChannelClosed
    }
}
