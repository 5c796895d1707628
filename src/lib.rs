//! Resilient HTTP client library.
//!
//! Wraps an HTTP transport with retry (exponential backoff with jitter)
//! and a circuit breaker. A client with a breaker configured runs each
//! call as a single guarded attempt; otherwise failures are retried.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod transport;

pub use config::{AppConfig, CircuitBreakerConfig, HttpClientConfig, RetryConfig};
pub use http::{ApiError, ApiResponse, HttpClient, HttpClientBuilder, Method, RequestConfig};
pub use lifecycle::{Shutdown, ShutdownSignal};
pub use resilience::{CircuitBreaker, CircuitBreakerStats, CircuitState};
pub use transport::{HyperTransport, ReqwestTransport, Transport};
