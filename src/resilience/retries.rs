//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a failure is retryable
//! - Execute retries with exponential backoff + jitter
//! - Stop waiting when shutdown is requested
//!
//! # Design Decisions
//! - Connection errors and timeouts always retryable; 5xx retryable; 4xx never
//! - Give up without sleeping once attempts are exhausted or the failure is final
//! - The last observed failure is the one propagated

use std::future::Future;

use crate::config::schema::RetryConfig;
use crate::http::ApiError;
use crate::lifecycle::ShutdownSignal;
use crate::resilience::backoff::calculate_backoff;

/// Retry network errors, timeouts and 5xx responses.
pub fn default_retry_condition(error: &ApiError) -> bool {
    if error.is_network_error() || error.is_timeout_error() {
        return true;
    }

    matches!(error.status(), Some(status) if status >= 500)
}

/// Check `error` against the configured condition, or the default one.
pub fn is_retryable(error: &ApiError, config: &RetryConfig) -> bool {
    match &config.retry_condition {
        Some(condition) => condition(error),
        None => default_retry_condition(error),
    }
}

/// Run `operation` until it succeeds, fails for good, or runs out of attempts.
///
/// At most `max_retries + 1` attempts are made.
pub async fn execute_with_retry<T, F, Fut>(operation: F, config: &RetryConfig) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    run(operation, config, None).await
}

/// Like [`execute_with_retry`], but a backoff wait is abandoned with
/// [`ApiError::Cancelled`] as soon as `signal` fires.
pub async fn execute_with_retry_until<T, F, Fut>(
    operation: F,
    config: &RetryConfig,
    signal: ShutdownSignal,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    run(operation, config, Some(signal)).await
}

async fn run<T, F, Fut>(
    mut operation: F,
    config: &RetryConfig,
    mut signal: Option<ShutdownSignal>,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let max_attempts = config.max_retries.saturating_add(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if attempt >= max_attempts {
            tracing::debug!(attempts = attempt, error = %error, "Retries exhausted");
            last_error = Some(error);
            break;
        }

        if !is_retryable(&error, config) {
            tracing::debug!(attempt, error = %error, "Failure is not retryable");
            last_error = Some(error);
            break;
        }

        let delay = calculate_backoff(attempt, config);
        tracing::info!(attempt, delay = ?delay, error = %error, "Retrying request");
        last_error = Some(error);

        match signal.as_mut() {
            Some(signal) => {
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = signal.triggered() => {
                        tracing::info!(attempt, "Shutdown during backoff, giving up");
                        return Err(ApiError::Cancelled);
                    }
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }

    Err(last_error.unwrap_or(ApiError::NoErrorCaptured))
}
