//! Transport backed by `reqwest`.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::http::response::normalize;
use crate::http::{ApiError, ApiResponse, Method, TransportRequest};
use crate::transport::Transport;

/// Sends requests with a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest` client.
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build reqwest client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing client, keeping its connection pool and TLS settings.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
    }
}

fn map_error(error: reqwest::Error, timeout_ms: u64) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout { timeout_ms }
    } else if error.is_builder() {
        ApiError::InvalidRequest(error.to_string())
    } else {
        ApiError::network(error.to_string())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    async fn send(&self, request: TransportRequest) -> Result<ApiResponse, ApiError> {
        let timeout_ms = request.timeout_ms();
        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), request.url.clone())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| map_error(e, timeout_ms))?;

        normalize(status, headers, &body)
    }
}
