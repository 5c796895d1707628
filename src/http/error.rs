//! Error types for HTTP calls.
//!
//! Every failure a caller can see is an [`ApiError`]. Transports produce
//! `Http`, `Network` and `Timeout`; the circuit breaker produces
//! `CircuitOpen`; the retry executor only ever propagates what it was given,
//! plus `Cancelled` when a shutdown interrupts a backoff wait.

use thiserror::Error;

use crate::http::response::ApiResponse;

/// Message carried by breaker rejections.
pub const CIRCUIT_OPEN_MESSAGE: &str = "Circuit breaker is OPEN";

/// Errors that can occur during an HTTP call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The remote answered with a non-2xx status.
    #[error("HTTP {status}: {status_text}")]
    Http {
        status: u16,
        status_text: String,
        response: Option<Box<ApiResponse>>,
    },

    /// The remote could not be reached.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The request did not finish before its deadline.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The circuit breaker rejected the call without running it.
    #[error("Circuit breaker is OPEN")]
    CircuitOpen,

    /// Shutdown was requested while waiting to retry.
    #[error("Request cancelled")]
    Cancelled,

    /// The request could not be built (URL, headers, body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The response body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The client configuration was rejected.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The retry loop finished without recording a failure.
    #[error("no error captured")]
    NoErrorCaptured,
}

impl ApiError {
    /// Shorthand for an HTTP status failure without a response snapshot.
    pub fn http(status: u16, status_text: impl Into<String>) -> Self {
        ApiError::Http {
            status,
            status_text: status_text.into(),
            response: None,
        }
    }

    /// Shorthand for a network failure.
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    /// Build an HTTP failure that keeps the normalized response.
    pub fn from_response(response: ApiResponse) -> Self {
        ApiError::Http {
            status: response.status,
            status_text: response.status_text.clone(),
            response: Some(Box::new(response)),
        }
    }

    /// HTTP-like status of the failure. Breaker rejections report 503.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::CircuitOpen => Some(503),
            _ => None,
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        match self {
            ApiError::Http { status_text, .. } => Some(status_text),
            ApiError::CircuitOpen => Some("Service Unavailable"),
            _ => None,
        }
    }

    /// Response snapshot attached to an HTTP failure.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ApiError::Http { response, .. } => response.as_deref(),
            _ => None,
        }
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self, ApiError::Network { .. })
    }

    pub fn is_timeout_error(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }

    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ApiError::CircuitOpen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circuit_open_shape() {
        let err = ApiError::CircuitOpen;
        assert_eq!(err.to_string(), CIRCUIT_OPEN_MESSAGE);
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.status_text(), Some("Service Unavailable"));
        assert!(!err.is_network_error());
        assert!(!err.is_timeout_error());
        assert!(err.is_circuit_open());
    }

    #[test]
    fn test_remote_error_is_distinguishable_from_breaker() {
        let remote = ApiError::http(503, "Service Unavailable");
        assert_eq!(remote.status(), Some(503));
        assert!(!remote.is_circuit_open());
    }

    #[test]
    fn test_classification_flags() {
        assert!(ApiError::network("refused").is_network_error());
        assert!(ApiError::Timeout { timeout_ms: 10 }.is_timeout_error());
        assert_eq!(ApiError::network("refused").status(), None);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::Timeout { timeout_ms: 250 }.to_string(),
            "Request timed out after 250 ms"
        );
        assert_eq!(ApiError::http(500, "Internal Server Error").to_string(), "HTTP 500: Internal Server Error");
    }
}
