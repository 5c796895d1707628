//! Response normalization.
//!
//! # Responsibilities
//! - Represent a transport outcome independently of the HTTP library
//! - Decode bodies: JSON when the content type says so, text otherwise
//! - Convert untyped JSON data into caller types
//!
//! # Design Decisions
//! - Header names are lowercased; the last value wins for repeated headers
//! - Empty bodies decode to `null`

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::error::ApiError;

/// A normalized HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T = Value> {
    /// Decoded body.
    pub data: T,
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase for the status.
    pub status_text: String,
    /// Response headers with lowercased names.
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse<Value> {
    /// Deserialize `data` into `T`, keeping status and headers.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<ApiResponse<T>, ApiError> {
        let data = serde_json::from_value(self.data)
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(ApiResponse {
            data,
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
        })
    }
}

impl<T> ApiResponse<T> {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Decode a raw body according to its content type.
pub fn decode_body(content_type: Option<&str>, body: &[u8]) -> Result<Value, ApiError> {
    if body.is_empty() {
        return Ok(Value::Null);
    }

    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    } else {
        Ok(Value::String(String::from_utf8_lossy(body).into_owned()))
    }
}

/// Reason phrase for a status code, empty when unknown.
pub fn status_text(status: u16) -> String {
    axum::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

/// Build a normalized response, or an [`ApiError::Http`] for non-2xx statuses.
///
/// A non-2xx body that claims JSON but does not parse is kept as text, so
/// the status still drives classification. A 2xx body that fails to parse
/// is reported as a network failure and is retryable.
pub fn normalize(
    status: u16,
    headers: BTreeMap<String, String>,
    body: &[u8],
) -> Result<ApiResponse, ApiError> {
    let success = (200..300).contains(&status);
    let data = match decode_body(headers.get("content-type").map(String::as_str), body) {
        Ok(data) => data,
        Err(e) if success => {
            return Err(ApiError::network(format!("failed to parse response body: {}", e)));
        }
        Err(_) => Value::String(String::from_utf8_lossy(body).into_owned()),
    };
    let response = ApiResponse {
        data,
        status,
        status_text: status_text(status),
        headers,
    };

    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn json_headers() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json; charset=utf-8".to_string());
        headers
    }

    #[test]
    fn test_decode_json_body() {
        let value = decode_body(Some("Application/JSON"), br#"{"id":1}"#).unwrap();
        assert_eq!(value, json!({"id": 1}));
    }

    #[test]
    fn test_decode_text_body() {
        let value = decode_body(Some("text/plain"), b"hello").unwrap();
        assert_eq!(value, Value::String("hello".into()));
    }

    #[test]
    fn test_decode_empty_body() {
        assert_eq!(decode_body(Some("application/json"), b"").unwrap(), Value::Null);
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode_body(Some("application/json"), b"{oops").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_normalize_success() {
        let response = normalize(200, json_headers(), br#"{"ok":true}"#).unwrap();
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.data, json!({"ok": true}));
    }

    #[test]
    fn test_normalize_error_keeps_snapshot() {
        let err = normalize(404, json_headers(), br#"{"error":"missing"}"#).unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.status_text(), Some("Not Found"));
        assert_eq!(err.to_string(), "HTTP 404: Not Found");

        let snapshot = err.response().unwrap();
        assert_eq!(snapshot.data, json!({"error": "missing"}));
    }

    #[test]
    fn test_error_status_survives_malformed_json() {
        let err = normalize(503, json_headers(), b"<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(crate::resilience::default_retry_condition(&err));
        assert_eq!(
            err.response().unwrap().data,
            Value::String("<html>bad gateway</html>".into())
        );
    }

    #[test]
    fn test_malformed_json_success_is_retryable() {
        let err = normalize(200, json_headers(), b"{truncated").unwrap_err();
        assert!(err.is_network_error());
        assert!(crate::resilience::default_retry_condition(&err));
    }

    #[test]
    fn test_into_typed() {
        #[derive(Debug, Deserialize, PartialEq)]
        struct User {
            id: u32,
        }

        let response = normalize(200, json_headers(), br#"{"id":7}"#).unwrap();
        let typed: ApiResponse<User> = response.into_typed().unwrap();
        assert_eq!(typed.data, User { id: 7 });
        assert_eq!(typed.status, 200);
    }
}
