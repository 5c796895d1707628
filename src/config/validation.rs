//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (delays > 0, thresholds > 0, multiplier >= 1)
//! - Check that URLs and headers can actually be sent
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the client

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::{AppConfig, CircuitBreakerConfig, HttpClientConfig, RetryConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a full configuration file.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    collect_client_errors(&config.client, &mut errors);

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    into_result(errors)
}

/// Validate the client section alone.
pub fn validate_client_config(config: &HttpClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    collect_client_errors(config, &mut errors);
    into_result(errors)
}

fn into_result(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn collect_client_errors(config: &HttpClientConfig, errors: &mut Vec<ValidationError>) {
    if let Some(base_url) = &config.base_url {
        if let Err(e) = Url::parse(base_url) {
            errors.push(ValidationError::new(
                "client.base_url",
                format!("'{}' is not an absolute URL: {}", base_url, e),
            ));
        }
    }

    if config.timeout_ms == Some(0) {
        errors.push(ValidationError::new("client.timeout_ms", "must be greater than 0"));
    }

    for (name, value) in &config.headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(
                format!("client.headers.{}", name),
                "invalid header name",
            ));
        }
        if HeaderValue::from_str(value).is_err() {
            errors.push(ValidationError::new(
                format!("client.headers.{}", name),
                "invalid header value",
            ));
        }
    }

    if let Some(retry) = &config.retry {
        collect_retry_errors(retry, errors);
    }

    if let Some(breaker) = &config.circuit_breaker {
        collect_breaker_errors(breaker, errors);
    }
}

fn collect_retry_errors(retry: &RetryConfig, errors: &mut Vec<ValidationError>) {
    if retry.base_delay_ms == 0 {
        errors.push(ValidationError::new("client.retry.base_delay_ms", "must be greater than 0"));
    }
    if retry.max_delay_ms < retry.base_delay_ms {
        errors.push(ValidationError::new(
            "client.retry.max_delay_ms",
            format!(
                "must be >= base_delay_ms ({} < {})",
                retry.max_delay_ms, retry.base_delay_ms
            ),
        ));
    }
    if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
        errors.push(ValidationError::new(
            "client.retry.backoff_multiplier",
            format!("must be a finite number >= 1 (got {})", retry.backoff_multiplier),
        ));
    }
}

fn collect_breaker_errors(breaker: &CircuitBreakerConfig, errors: &mut Vec<ValidationError>) {
    if breaker.failure_threshold == 0 {
        errors.push(ValidationError::new(
            "client.circuit_breaker.failure_threshold",
            "must be greater than 0",
        ));
    }
    if breaker.half_open_max_calls == 0 {
        errors.push(ValidationError::new(
            "client.circuit_breaker.half_open_max_calls",
            "must be greater than 0",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.client.base_url = Some("not a url".into());
        config.client.retry = Some(
            RetryConfig::default()
                .with_base_delay_ms(0)
                .with_backoff_multiplier(0.5),
        );
        config.client.circuit_breaker = Some(
            CircuitBreakerConfig::default()
                .with_failure_threshold(0)
                .with_half_open_max_calls(0),
        );
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert!(fields.contains(&"client.base_url"));
        assert!(fields.contains(&"client.retry.base_delay_ms"));
        assert!(fields.contains(&"client.retry.backoff_multiplier"));
        assert!(fields.contains(&"client.circuit_breaker.failure_threshold"));
        assert!(fields.contains(&"client.circuit_breaker.half_open_max_calls"));
        assert!(fields.contains(&"observability.log_level"));
    }

    #[test]
    fn test_max_delay_below_base_delay() {
        let config = HttpClientConfig::default()
            .with_retry(RetryConfig::default().with_base_delay_ms(500).with_max_delay_ms(100));

        let errors = validate_client_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "client.retry.max_delay_ms");
    }

    #[test]
    fn test_rejects_bad_headers_and_zero_timeout() {
        let config = HttpClientConfig::default()
            .with_header("bad header", "ok")
            .with_header("x-ok", "line\nbreak")
            .with_timeout_ms(0);

        let errors = validate_client_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new("client.timeout_ms", "must be greater than 0");
        assert_eq!(err.to_string(), "client.timeout_ms: must be greater than 0");
    }
}
