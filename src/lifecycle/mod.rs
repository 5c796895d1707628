//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT/SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     Shutdown::trigger → every ShutdownSignal observes it
//!     → retry executor abandons a pending backoff wait
//! ```
//!
//! # Design Decisions
//! - Shutdown is a latched flag: late subscribers still see it
//! - In-flight attempts are not interrupted; only backoff waits are

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
