//! Circuit breaker for dependency protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: dependency assumed down, requests fail fast
//! - Half-Open: testing if dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: first call at or after next_attempt_time
//! Half-Open → Closed: success_count reaches failure_threshold
//! Half-Open → Open: any failure
//! ```
//!
//! # Design Decisions
//! - One breaker per client (per dependency), never shared globally
//! - Fail fast in Open state (no waiting for timeout)
//! - Open → Half-Open is checked lazily on the next call; there is no
//!   background timer, so an idle open breaker stays open until used
//! - At most `half_open_max_calls` probes in Half-Open
//! - `success_count` is a running counter; it is not reset on entering
//!   Half-Open, only when the circuit closes or is reset
//! - The state lock is never held across the guarded operation

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::CircuitBreakerConfig;
use crate::http::ApiError;
use crate::resilience::clock::{Clock, SystemClock};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerStats {
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    /// Milliseconds since the Unix epoch.
    pub last_failure_time: Option<u64>,
    /// Milliseconds since the Unix epoch.
    pub next_attempt_time: Option<u64>,
    pub half_open_calls: u32,
}

/// Rejection produced when the breaker refuses to admit a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Circuit breaker is OPEN")]
pub struct CircuitOpenError {
    /// State the breaker was in when it rejected the call.
    pub state: CircuitState,
}

impl From<CircuitOpenError> for ApiError {
    fn from(_: CircuitOpenError) -> Self {
        ApiError::CircuitOpen
    }
}

#[derive(Debug, Clone)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    last_failure_time: Option<u64>,
    next_attempt_time: Option<u64>,
    half_open_calls: u32,
}

impl BreakerState {
    fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            success_count: 0,
            last_failure_time: None,
            next_attempt_time: None,
            half_open_calls: 0,
        }
    }

    fn should_attempt_reset(&self, now: u64) -> bool {
        if self.last_failure_time.is_none() {
            return false;
        }
        now >= self.next_attempt_time.unwrap_or(0)
    }
}

/// Three-state circuit breaker guarding calls to one dependency.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    /// Create a breaker reading time from the system clock.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a breaker with a custom time source.
    pub fn with_clock(config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            state: Mutex::new(BreakerState::new()),
            clock,
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Run `operation` if the breaker admits it, recording the outcome.
    ///
    /// Rejected calls return `E::from(CircuitOpenError)` without invoking
    /// `operation` or touching any counter.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<CircuitOpenError>,
    {
        self.admit().map_err(E::from)?;

        match operation().await {
            Ok(value) => {
                self.on_success();
                Ok(value)
            }
            Err(e) => {
                self.on_failure();
                Err(e)
            }
        }
    }

    /// Snapshot of state and counters. Never changes state.
    pub fn stats(&self) -> CircuitBreakerStats {
        let state = self.lock();
        CircuitBreakerStats {
            state: state.state,
            failure_count: state.failure_count,
            success_count: state.success_count,
            last_failure_time: state.last_failure_time,
            next_attempt_time: state.next_attempt_time,
            half_open_calls: state.half_open_calls,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    /// Force the breaker back to a clean Closed state.
    pub fn reset(&self) {
        let mut state = self.lock();
        *state = BreakerState::new();
        tracing::info!("circuit breaker reset");
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Result<(), CircuitOpenError> {
        let mut state = self.lock();

        if state.state == CircuitState::Open {
            if state.should_attempt_reset(self.clock.now_millis()) {
                state.state = CircuitState::HalfOpen;
                state.half_open_calls = 0;
                tracing::info!(
                    success_count = state.success_count,
                    "circuit breaker transitioning to half-open"
                );
            } else {
                tracing::debug!(
                    next_attempt_time = ?state.next_attempt_time,
                    "circuit breaker open, rejecting call"
                );
                return Err(CircuitOpenError {
                    state: CircuitState::Open,
                });
            }
        }

        if state.state == CircuitState::HalfOpen {
            if state.half_open_calls >= self.config.half_open_max_calls {
                tracing::debug!(
                    half_open_calls = state.half_open_calls,
                    "circuit breaker half-open probe limit reached, rejecting call"
                );
                return Err(CircuitOpenError {
                    state: CircuitState::HalfOpen,
                });
            }
            state.half_open_calls += 1;
        }

        Ok(())
    }

    fn on_success(&self) {
        let mut state = self.lock();
        state.success_count = state.success_count.saturating_add(1);

        if state.state == CircuitState::HalfOpen {
            if state.success_count >= self.config.failure_threshold {
                state.state = CircuitState::Closed;
                state.failure_count = 0;
                state.success_count = 0;
                state.last_failure_time = None;
                state.next_attempt_time = None;
                tracing::info!("circuit breaker closed - dependency recovered");
            }
        } else {
            state.failure_count = 0;
        }
    }

    fn on_failure(&self) {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure_time = Some(now);

        let reopen = state.state == CircuitState::HalfOpen;
        if reopen || state.failure_count >= self.config.failure_threshold {
            state.state = CircuitState::Open;
            state.next_attempt_time = Some(now.saturating_add(self.config.recovery_timeout_ms));
            if reopen {
                tracing::warn!("circuit breaker re-opened - probe failed");
            } else {
                tracing::warn!(
                    failures = state.failure_count,
                    "circuit breaker opened - too many failures"
                );
            }
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &*self.lock())
            .field("clock", &self.clock)
            .finish()
    }
}
