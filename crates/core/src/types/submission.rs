//! Wire bodies and outcomes of a payload submission

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MESSAGE_SENDING: &str = "Sending...";
pub const MESSAGE_SERVER_ERROR: &str = "Error sending data to the server.";
pub const MESSAGE_NETWORK_FAILURE: &str = "Error: Unable to send data.";

/// JSON body POSTed to the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub scanned_data: String,
}

impl SubmitRequest {
    pub fn new(scanned_data: impl Into<String>) -> Self {
        Self {
            scanned_data: scanned_data.into(),
        }
    }
}

/// JSON body returned on a 2xx response
///
/// Other fields (e.g. a server-assigned `id`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[serde(default)]
    pub scanned_data: Option<Value>,
}

impl SubmitResponse {
    /// Text shown after "Success: "
    ///
    /// Falls back to the payload that was sent when the server did not echo it.
    pub fn echoed_or(&self, sent: &str) -> String {
        match &self.scanned_data {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => sent.to_string(),
            Some(other) => other.to_string(),
        }
    }
}

/// Why a submission did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered outside 200-299
    ServerError { status: u16 },
    /// Transport failure, timeout or unreadable body
    NetworkFailure { reason: String },
}

/// Outcome of one submission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionResult {
    Pending,
    Succeeded { echoed: String },
    Failed(FailureKind),
}

impl SubmissionResult {
    pub fn server_error(status: u16) -> Self {
        Self::Failed(FailureKind::ServerError { status })
    }

    pub fn network_failure(reason: impl Into<String>) -> Self {
        Self::Failed(FailureKind::NetworkFailure {
            reason: reason.into(),
        })
    }

    /// Status line displayed to the user
    pub fn status_message(&self) -> String {
        match self {
            Self::Pending => MESSAGE_SENDING.to_string(),
            Self::Succeeded { echoed } => format!("Success: {}", echoed),
            Self::Failed(FailureKind::ServerError { .. }) => MESSAGE_SERVER_ERROR.to_string(),
            Self::Failed(FailureKind::NetworkFailure { .. }) => {
                MESSAGE_NETWORK_FAILURE.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_camel_case() {
        let json = serde_json::to_string(&SubmitRequest::new("ABC123")).unwrap();
        assert_eq!(json, r#"{"scannedData":"ABC123"}"#);
    }

    #[test]
    fn test_response_echo() {
        let body: SubmitResponse =
            serde_json::from_str(r#"{"scannedData":"ABC123","id":101}"#).unwrap();
        assert_eq!(body.echoed_or("ignored"), "ABC123");
    }

    #[test]
    fn test_response_missing_echo_falls_back() {
        let body: SubmitResponse = serde_json::from_str(r#"{"id":101}"#).unwrap();
        assert_eq!(body.echoed_or("ABC123"), "ABC123");

        let body: SubmitResponse = serde_json::from_str(r#"{"scannedData":null}"#).unwrap();
        assert_eq!(body.echoed_or("ABC123"), "ABC123");
    }

    #[test]
    fn test_response_non_string_echo() {
        let body: SubmitResponse = serde_json::from_str(r#"{"scannedData":42}"#).unwrap();
        assert_eq!(body.echoed_or("x"), "42");
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(SubmissionResult::Pending.status_message(), "Sending...");
        assert_eq!(
            SubmissionResult::Succeeded {
                echoed: "ABC123".to_string()
            }
            .status_message(),
            "Success: ABC123"
        );
        assert_eq!(
            SubmissionResult::server_error(500).status_message(),
            "Error sending data to the server."
        );
        assert_eq!(
            SubmissionResult::network_failure("connection refused").status_message(),
            "Error: Unable to send data."
        );
    }
}
