//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → HttpClientConfig handed to HttpClient::builder
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a client is rebuilt to change it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::CircuitBreakerConfig;
pub use schema::HttpClientConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::RetryCondition;
pub use schema::RetryConfig;
