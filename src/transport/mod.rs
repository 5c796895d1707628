//! Transport bindings.
//!
//! # Data Flow
//! ```text
//! HttpClient
//!     → TransportRequest (method, url, headers, timeout, body)
//!     → Transport::send
//!         → reqwest_transport.rs (reqwest client)
//!         → hyper_transport.rs (hyper-util legacy client)
//!     → ApiResponse | ApiError (Http / Network / Timeout)
//! ```
//!
//! # Design Decisions
//! - Every binding normalizes into the same response and error shapes,
//!   which is what retry and breaker classification rely on
//! - Non-2xx statuses are failures carrying a response snapshot
//! - Each binding enforces the request deadline itself

use async_trait::async_trait;

use crate::http::{ApiError, ApiResponse, TransportRequest};

pub mod hyper_transport;
pub mod reqwest_transport;

pub use hyper_transport::HyperTransport;
pub use reqwest_transport::ReqwestTransport;

/// Sends one normalized request and normalizes the outcome.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    async fn send(&self, request: TransportRequest) -> Result<ApiResponse, ApiError>;
}
