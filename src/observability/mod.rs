//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! http::client (span per call, carries request_id)
//!     → resilience (retry attempts, breaker transitions as events)
//!     → logging.rs (subscriber formats and filters everything)
//! ```
//!
//! # Design Decisions
//! - The library only emits `tracing` events; installing a subscriber is
//!   the binary's job
//! - Request ID flows through every event via the enclosing span

pub mod logging;

pub use logging::init_logging;
