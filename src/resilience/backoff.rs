//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::schema::RetryConfig;

/// Upper bound of the jitter fraction added on top of the exponential delay.
pub const MAX_JITTER_FRACTION: f64 = 0.1;

/// Calculate the delay before retry number `attempt` (1-based).
///
/// `base * multiplier^(attempt-1)` plus up to 10% jitter, capped at
/// `max_delay_ms` after the jitter is added.
pub fn calculate_backoff(attempt: u32, config: &RetryConfig) -> Duration {
    let jitter_fraction = rand::thread_rng().gen_range(0.0..MAX_JITTER_FRACTION);
    backoff_with_jitter(attempt, config, jitter_fraction)
}

/// Deterministic form of [`calculate_backoff`] for a given jitter draw.
pub fn backoff_with_jitter(attempt: u32, config: &RetryConfig, jitter_fraction: f64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let max_delay = config.max_delay_ms as f64;
    let exponential =
        config.base_delay_ms as f64 * config.backoff_multiplier.powf(f64::from(attempt - 1));
    let jitter = jitter_fraction.clamp(0.0, MAX_JITTER_FRACTION) * exponential;

    let delay = (exponential + jitter).min(max_delay);
    let delay_ms = if delay.is_finite() && delay >= 0.0 {
        delay.floor() as u64
    } else {
        config.max_delay_ms
    };

    Duration::from_millis(delay_ms)
}
