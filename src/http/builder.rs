//! Client construction.
//!
//! # Responsibilities
//! - Validate the client configuration before anything is built
//! - Allow a custom transport, clock or shutdown signal
//! - Default to the reqwest transport and the system clock

use std::sync::Arc;

use crate::config::schema::HttpClientConfig;
use crate::config::validation::validate_client_config;
use crate::http::client::HttpClient;
use crate::http::error::ApiError;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::circuit_breaker::CircuitBreaker;
use crate::resilience::clock::{Clock, SystemClock};
use crate::transport::{ReqwestTransport, Transport};

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
    transport: Option<Arc<dyn Transport>>,
    clock: Option<Arc<dyn Clock>>,
    shutdown: Option<ShutdownSignal>,
}

impl HttpClientBuilder {
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            config,
            transport: None,
            clock: None,
            shutdown: None,
        }
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Clock used by the circuit breaker.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Make retry backoff waits cancellable.
    pub fn shutdown_signal(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown = Some(signal);
        self
    }

    pub fn build(self) -> Result<HttpClient, ApiError> {
        if let Err(errors) = validate_client_config(&self.config) {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ApiError::Config(message));
        }

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let circuit_breaker = self
            .config
            .circuit_breaker
            .clone()
            .map(|breaker| CircuitBreaker::with_clock(breaker, clock));
        let retry_config = self.config.retry.clone().unwrap_or_default();

        tracing::debug!(
            transport = transport.name(),
            circuit_breaker = circuit_breaker.is_some(),
            max_retries = retry_config.max_retries,
            "HTTP client built"
        );

        Ok(HttpClient {
            config: self.config,
            retry_config,
            circuit_breaker,
            transport,
            shutdown: self.shutdown,
        })
    }
}
