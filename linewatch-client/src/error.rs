//! Error types for predictor requests.

use thiserror::Error;

/// A failed request to the predictor service.
///
/// Every way a request can go wrong (transport, status, payload) ends up
/// here, so callers can treat a failed poll uniformly.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestFailure {
    /// Could not reach the service.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("request timed out")]
    Timeout,

    /// The service answered with a non-2xx status.
    #[error("predictor returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Any other HTTP-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl RequestFailure {
    /// Whether the failure happened before the service answered.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RequestFailure::Connection(_) | RequestFailure::Timeout | RequestFailure::Http(_)
        )
    }
}

impl From<reqwest::Error> for RequestFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestFailure::Timeout
        } else if err.is_connect() {
            RequestFailure::Connection(err.to_string())
        } else if err.is_decode() {
            RequestFailure::Malformed(err.to_string())
        } else {
            RequestFailure::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RequestFailure {
    fn from(err: serde_json::Error) -> Self {
        RequestFailure::Malformed(err.to_string())
    }
}
