//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http::ApiError;

/// Default base delay between retries in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Default ceiling for a single backoff delay in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Default time an open circuit waits before probing, in milliseconds.
pub const DEFAULT_RECOVERY_TIMEOUT_MS: u64 = 60_000;

/// Default monitoring window in milliseconds.
pub const DEFAULT_MONITORING_PERIOD_MS: u64 = 60_000;

/// Request timeout applied when neither the request nor the client sets one.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Root configuration loaded from a TOML file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP client settings.
    pub client: HttpClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Construction-time configuration of an [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Base URL every request path is joined onto.
    pub base_url: Option<String>,

    /// Default request timeout in milliseconds.
    pub timeout_ms: Option<u64>,

    /// Headers sent with every request.
    pub headers: BTreeMap<String, String>,

    /// Retry policy. Absent means [`RetryConfig::default`].
    pub retry: Option<RetryConfig>,

    /// Circuit breaker settings. Absent means no breaker is attached.
    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl HttpClientConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the default request timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Add a default header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Attach a circuit breaker.
    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(circuit_breaker);
        self
    }
}

/// Predicate deciding whether a failure is worth another attempt.
pub type RetryCondition = Arc<dyn Fn(&ApiError) -> bool + Send + Sync>;

/// Retry configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Number of retries after the first attempt.
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Growth factor applied per attempt.
    pub backoff_multiplier: f64,

    /// Custom retryability check. `None` uses the default condition.
    #[serde(skip)]
    pub retry_condition: Option<RetryCondition>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            backoff_multiplier: 2.0,
            retry_condition: None,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay_ms(mut self, base_delay_ms: u64) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    pub fn with_max_delay_ms(mut self, max_delay_ms: u64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Replace the default retry condition.
    pub fn with_retry_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&ApiError) -> bool + Send + Sync + 'static,
    {
        self.retry_condition = Some(Arc::new(condition));
        self
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .field("max_delay_ms", &self.max_delay_ms)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field(
                "retry_condition",
                &self.retry_condition.as_ref().map(|_| "<closure>"),
            )
            .finish()
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Failures that trip the circuit. Also the number of successes
    /// needed to close it again from half-open.
    pub failure_threshold: u32,

    /// Time spent open before a probe is allowed, in milliseconds.
    pub recovery_timeout_ms: u64,

    /// Informational monitoring window in milliseconds. Counters are not
    /// decayed over it.
    pub monitoring_period_ms: u64,

    /// Calls admitted while half-open.
    pub half_open_max_calls: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout_ms: DEFAULT_RECOVERY_TIMEOUT_MS,
            monitoring_period_ms: DEFAULT_MONITORING_PERIOD_MS,
            half_open_max_calls: 3,
        }
    }
}

impl CircuitBreakerConfig {
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    pub fn with_recovery_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.recovery_timeout_ms = timeout_ms;
        self
    }

    pub fn with_monitoring_period_ms(mut self, period_ms: u64) -> Self {
        self.monitoring_period_ms = period_ms;
        self
    }

    pub fn with_half_open_max_calls(mut self, max_calls: u32) -> Self {
        self.half_open_max_calls = max_calls;
        self
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Full,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Output format for log lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Full,
        }
    }
}
