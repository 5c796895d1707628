//! Transport backed by the `hyper-util` legacy client.
//!
//! Plain HTTP only: the connector is a bare `HttpConnector`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_LENGTH;
use axum::http::Request;
use hyper::body::Incoming;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::http::response::normalize;
use crate::http::{ApiError, ApiResponse, TransportRequest};
use crate::resilience::timeouts::with_timeout;
use crate::transport::Transport;

/// Largest response body the transport will buffer.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Sends requests with a pooled hyper client.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Body>,
    max_body_bytes: usize,
}

impl HyperTransport {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            max_body_bytes: MAX_BODY_BYTES,
        }
    }

    /// Cap on buffered response bodies. Larger bodies fail with `ApiError::Decode`.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    async fn round_trip(&self, request: TransportRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = request.body.map(Body::from).unwrap_or_else(Body::empty);
        let http_request = builder
            .body(body)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

        let response: hyper::Response<Incoming> = self
            .client
            .request(http_request)
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;

        let (parts, body) = response.into_parts();
        let declared = parts
            .headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if let Some(length) = declared.filter(|&length| length > self.max_body_bytes) {
            return Err(body_too_large(length, self.max_body_bytes));
        }

        let bytes = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
            .await
            .map_err(|e| {
                if is_length_limit(&e) {
                    ApiError::Decode(format!(
                        "response body exceeds limit of {} bytes",
                        self.max_body_bytes
                    ))
                } else {
                    ApiError::network(format!("failed to read response body: {}", e))
                }
            })?;

        let headers: BTreeMap<String, String> = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        normalize(parts.status.as_u16(), headers, &bytes)
    }
}

fn body_too_large(length: usize, max: usize) -> ApiError {
    ApiError::Decode(format!(
        "response body of {} bytes exceeds limit of {} bytes",
        length, max
    ))
}

/// A streamed body that outgrew the limit; the size is not known up front.
fn is_length_limit(error: &axum::Error) -> bool {
    error.to_string().contains("length limit exceeded")
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    fn name(&self) -> &'static str {
        "hyper"
    }

    async fn send(&self, request: TransportRequest) -> Result<ApiResponse, ApiError> {
        with_timeout(request.timeout, self.round_trip(request)).await
    }
}
