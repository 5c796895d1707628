//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to dependency:
//!     → timeouts.rs (transport enforces the per-call deadline)
//!     → circuit breaker configured?
//!         yes → circuit_breaker.rs (admit, run once, record outcome)
//!         no  → retries.rs (check if retryable, retry with backoff.rs delays)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every transport call has a deadline
//! - Retry and circuit breaker are not stacked: a breaker supervises a
//!   single attempt, so retry storms cannot drain the half-open probe budget
//! - Circuit breaker prevents cascading failures
//! - No background tasks; all state changes happen on the caller's path

pub mod backoff;
pub mod circuit_breaker;
pub mod clock;
pub mod retries;
pub mod timeouts;

pub use backoff::calculate_backoff;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerStats, CircuitOpenError, CircuitState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use retries::{default_retry_condition, execute_with_retry, execute_with_retry_until};
pub use timeouts::with_timeout;
