//! Request description and preparation.
//!
//! # Responsibilities
//! - Describe a logical request independently of the transport
//! - Join the client base URL with the request path
//! - Append query parameters and merge headers
//! - Encode JSON bodies
//!
//! # Design Decisions
//! - Header precedence: built-in defaults < client headers < request headers
//! - Header names are compared case-insensitively (stored lowercased)
//! - GET requests never carry a body

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::schema::{HttpClientConfig, DEFAULT_TIMEOUT_MS};
use crate::http::error::ApiError;

/// Header carrying the per-call request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Supported HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical request as the caller describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: Method,
    /// Absolute URL, or a path relative to the client base URL.
    pub url: String,
    /// JSON body.
    pub data: Option<Value>,
    /// Per-request headers, overriding client defaults.
    pub headers: BTreeMap<String, String>,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Query parameters, appended in order.
    pub params: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data: None,
            headers: BTreeMap::new(),
            timeout_ms: None,
            params: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::Patch, url)
    }

    /// Attach a JSON body.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Append a query parameter. Numbers and booleans are rendered with `Display`.
    pub fn param(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }
}

/// A fully resolved request handed to a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    /// Lowercased header names.
    pub headers: BTreeMap<String, String>,
    pub timeout: Duration,
    /// Serialized JSON body.
    pub body: Option<Vec<u8>>,
}

impl TransportRequest {
    /// Resolve a [`RequestConfig`] against the client configuration.
    pub fn prepare(client: &HttpClientConfig, request: &RequestConfig) -> Result<Self, ApiError> {
        let mut url = build_url(client.base_url.as_deref(), &request.url)?;
        if !request.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.params {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        for (name, value) in client.headers.iter().chain(request.headers.iter()) {
            headers.insert(name.to_ascii_lowercase(), value.clone());
        }

        // Zero means unset, at either level.
        let timeout_ms = request
            .timeout_ms
            .filter(|&ms| ms > 0)
            .or(client.timeout_ms.filter(|&ms| ms > 0))
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let body = match (&request.data, request.method) {
            (Some(_), Method::Get) | (None, _) => None,
            (Some(data), _) => Some(
                serde_json::to_vec(data).map_err(|e| ApiError::InvalidRequest(e.to_string()))?,
            ),
        };

        Ok(Self {
            method: request.method,
            url,
            headers,
            timeout: Duration::from_millis(timeout_ms),
            body,
        })
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Join a base URL and a request URL with exactly one slash between them.
pub fn build_url(base_url: Option<&str>, url: &str) -> Result<Url, ApiError> {
    let full = match base_url {
        Some(base) => format!(
            "{}/{}",
            base.trim_end_matches('/'),
            url.trim_start_matches('/')
        ),
        None => url.to_string(),
    };

    Url::parse(&full).map_err(|e| ApiError::InvalidRequest(format!("invalid URL '{}': {}", full, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> HttpClientConfig {
        HttpClientConfig::default()
            .with_base_url("https://api.example.com/v1/")
            .with_header("Authorization", "Bearer abc")
            .with_header("X-Client", "default")
    }

    #[test]
    fn test_build_url_joins_with_single_slash() {
        let url = build_url(Some("https://api.example.com/v1/"), "/users").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/users");

        let url = build_url(Some("https://api.example.com"), "users").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/users");
    }

    #[test]
    fn test_build_url_without_base() {
        let url = build_url(None, "http://localhost:8080/health").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/health");
        assert!(build_url(None, "/relative").is_err());
    }

    #[test]
    fn test_params_are_appended_in_order() {
        let request = RequestConfig::get("/search")
            .param("q", "rust lang")
            .param("page", 2)
            .param("exact", true);

        let prepared = TransportRequest::prepare(&client(), &request).unwrap();
        assert_eq!(
            prepared.url.as_str(),
            "https://api.example.com/v1/search?q=rust+lang&page=2&exact=true"
        );
    }

    #[test]
    fn test_header_precedence() {
        let request = RequestConfig::get("/users").header("X-Client", "override");
        let prepared = TransportRequest::prepare(&client(), &request).unwrap();

        assert_eq!(prepared.headers["content-type"], "application/json");
        assert_eq!(prepared.headers["authorization"], "Bearer abc");
        assert_eq!(prepared.headers["x-client"], "override");
    }

    #[test]
    fn test_get_never_has_body() {
        let request = RequestConfig::get("/users").data(json!({"ignored": true}));
        let prepared = TransportRequest::prepare(&client(), &request).unwrap();
        assert!(prepared.body.is_none());
    }

    #[test]
    fn test_post_encodes_json_body() {
        let request = RequestConfig::post("/users").data(json!({"name": "ada"}));
        let prepared = TransportRequest::prepare(&client(), &request).unwrap();
        assert_eq!(prepared.body.as_deref(), Some(br#"{"name":"ada"}"#.as_slice()));
    }

    #[test]
    fn test_timeout_resolution() {
        let config = client();
        let prepared = TransportRequest::prepare(&config, &RequestConfig::get("/")).unwrap();
        assert_eq!(prepared.timeout_ms(), DEFAULT_TIMEOUT_MS);

        let config = client().with_timeout_ms(1500);
        let prepared = TransportRequest::prepare(&config, &RequestConfig::get("/")).unwrap();
        assert_eq!(prepared.timeout_ms(), 1500);

        let prepared =
            TransportRequest::prepare(&config, &RequestConfig::get("/").timeout_ms(200)).unwrap();
        assert_eq!(prepared.timeout_ms(), 200);

        let prepared =
            TransportRequest::prepare(&config, &RequestConfig::get("/").timeout_ms(0)).unwrap();
        assert_eq!(prepared.timeout_ms(), 1500);

        let prepared =
            TransportRequest::prepare(&client(), &RequestConfig::get("/").timeout_ms(0)).unwrap();
        assert_eq!(prepared.timeout_ms(), DEFAULT_TIMEOUT_MS);
    }
}
