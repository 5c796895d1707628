//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap transport calls with a deadline
//! - Report expired deadlines as `ApiError::Timeout`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors and retryable by default
//! - Dropping the timed-out future cancels the underlying call

use std::future::Future;
use std::time::Duration;

use crate::http::ApiError;

/// Run `fut` with a deadline of `duration`.
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout {
            timeout_ms: duration.as_millis() as u64,
        }),
    }
}
