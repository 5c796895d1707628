//! The resilient HTTP client.
//!
//! # Responsibilities
//! - Turn a `RequestConfig` into a `TransportRequest`
//! - Guard each call with the circuit breaker, or retry it when no breaker is set
//! - Attach a request id and a tracing span to every call
//! - Expose breaker stats and reset
//!
//! # Design Decisions
//! - Breaker and retry are mutually exclusive per client: a breaker
//!   supervises exactly one attempt and never retries underneath
//! - The prepared request is built once and cloned per attempt
//! - Typed decoding happens after the guarded call, so a decode failure
//!   never counts against the breaker

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::schema::{HttpClientConfig, RetryConfig};
use crate::http::builder::HttpClientBuilder;
use crate::http::error::ApiError;
use crate::http::request::{Method, RequestConfig, TransportRequest, X_REQUEST_ID};
use crate::http::response::ApiResponse;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitBreakerStats};
use crate::resilience::retries::{execute_with_retry, execute_with_retry_until};
use crate::transport::Transport;

/// HTTP client with retry and circuit breaking.
#[derive(Debug)]
pub struct HttpClient {
    pub(crate) config: HttpClientConfig,
    pub(crate) retry_config: RetryConfig,
    pub(crate) circuit_breaker: Option<CircuitBreaker>,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) shutdown: Option<ShutdownSignal>,
}

impl HttpClient {
    /// Build a client over the default reqwest transport.
    pub fn new(config: HttpClientConfig) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    pub fn builder(config: HttpClientConfig) -> HttpClientBuilder {
        HttpClientBuilder::new(config)
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Execute a request and return the untyped response.
    pub async fn execute(&self, request: RequestConfig) -> Result<ApiResponse, ApiError> {
        let mut prepared = TransportRequest::prepare(&self.config, &request)?;
        let request_id = prepared
            .headers
            .entry(X_REQUEST_ID.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        let span = tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %prepared.method,
            url = %prepared.url,
            transport = self.transport.name(),
        );

        self.dispatch(prepared).instrument(span).await
    }

    async fn dispatch(&self, prepared: TransportRequest) -> Result<ApiResponse, ApiError> {
        let call = || {
            let transport = self.transport.clone();
            let request = prepared.clone();
            async move { transport.send(request).await }
        };

        let result = match (&self.circuit_breaker, &self.shutdown) {
            (Some(breaker), _) => breaker.execute(call).await,
            (None, Some(signal)) => {
                execute_with_retry_until(call, &self.retry_config, signal.clone()).await
            }
            (None, None) => execute_with_retry(call, &self.retry_config).await,
        };

        match &result {
            Ok(response) => tracing::debug!(status = response.status, "Request completed"),
            Err(e) => tracing::warn!(error = %e, "Request failed"),
        }
        result
    }

    /// Execute a request and decode `data` into `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        request: RequestConfig,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.execute(request).await?.into_typed()
    }

    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(RequestConfig::get(url)).await
    }

    /// GET with query parameters.
    pub async fn get_with_params<T, K, V>(
        &self,
        url: &str,
        params: impl IntoIterator<Item = (K, V)>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        K: Into<String>,
        V: std::fmt::Display,
    {
        let request = params
            .into_iter()
            .fold(RequestConfig::get(url), |request, (key, value)| request.param(key, value));
        self.request(request).await
    }

    pub async fn post<T, B>(&self, url: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::Post, url, body).await
    }

    pub async fn put<T, B>(&self, url: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::Put, url, body).await
    }

    pub async fn patch<T, B>(&self, url: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(Method::Patch, url, body).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<T>, ApiError> {
        self.request(RequestConfig::delete(url)).await
    }

    async fn send_json<T, B>(&self, method: Method, url: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let data: Value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.request(RequestConfig::new(method, url).data(data)).await
    }

    /// Breaker snapshot, or `None` when no breaker is configured.
    pub fn circuit_breaker_stats(&self) -> Option<CircuitBreakerStats> {
        self.circuit_breaker.as_ref().map(CircuitBreaker::stats)
    }

    /// Reset the breaker. No-op when no breaker is configured.
    pub fn reset_circuit_breaker(&self) {
        if let Some(breaker) = &self.circuit_breaker {
            breaker.reset();
        }
    }
}
