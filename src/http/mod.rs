//! HTTP client subsystem.
//!
//! # Data Flow
//! ```text
//! Caller
//!     → client.rs (RequestConfig, request id, tracing span)
//!     → request.rs (join base URL, merge headers, encode body)
//!     → circuit breaker or retry executor (resilience/)
//!     → transport (reqwest or hyper)
//!     → response.rs (decode body, classify status)
//!     → error.rs (ApiError on any failure)
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod request;
pub mod response;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use error::ApiError;
pub use request::{Method, RequestConfig, TransportRequest, X_REQUEST_ID};
pub use response::ApiResponse;
