//! Exponential backoff without jitter.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Compute the backoff delay in milliseconds.
///
/// # Formula
/// `delay = min(base * 2^attempt, max_delay)`
///
/// Uses saturating arithmetic, so very large attempt numbers clamp to
/// `max_delay_ms` instead of overflowing.
#[must_use]
pub const fn compute_delay_ms(attempt: u32, base_delay_ms: u64, max_delay_ms: u64) -> u64 {
    let delay = if attempt >= 63 {
        u64::MAX
    } else {
        base_delay_ms.saturating_mul(1u64 << attempt)
    };

    if delay < max_delay_ms { delay } else { max_delay_ms }
}

/// Backoff configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffPolicy {
    /// Base delay multiplied by `2^attempt`.
    ///
    /// Default: 100 milliseconds
    #[serde(default = "defaults::base_delay_ms")]
    pub base_delay_ms: u64,

    /// Upper bound for any single delay.
    ///
    /// Default: 10,000 milliseconds
    #[serde(default = "defaults::max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay_ms: defaults::base_delay_ms(),
            max_delay_ms: defaults::max_delay_ms(),
        }
    }
}

impl BackoffPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-indexed).
    #[must_use]
    pub const fn compute_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(compute_delay_ms(
            attempt,
            self.base_delay_ms,
            self.max_delay_ms,
        ))
    }
}

mod defaults {
    pub const fn base_delay_ms() -> u64 {
        100
    }

    pub const fn max_delay_ms() -> u64 {
        10_000
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_delays() {
        let policy = BackoffPolicy::default();

        assert_eq!(policy.compute_delay(1), Duration::from_millis(200));
        assert_eq!(policy.compute_delay(2), Duration::from_millis(400));
        assert_eq!(policy.compute_delay(5), Duration::from_millis(3200));
        assert_eq!(policy.compute_delay(6), Duration::from_millis(6400));
    }

    #[test]
    fn delays_are_capped() {
        let policy = BackoffPolicy::default();

        assert_eq!(policy.compute_delay(7), Duration::from_millis(10_000));
        assert_eq!(policy.compute_delay(10), Duration::from_millis(10_000));
    }

    #[test]
    fn huge_attempts_do_not_overflow() {
        assert_eq!(compute_delay_ms(63, 100, 10_000), 10_000);
        assert_eq!(compute_delay_ms(u32::MAX, 100, 10_000), 10_000);
        assert_eq!(compute_delay_ms(60, u64::MAX, u64::MAX), u64::MAX);
    }

    #[test]
    fn custom_base_and_cap() {
        let policy = BackoffPolicy {
            base_delay_ms: 10,
            max_delay_ms: 50,
        };

        assert_eq!(policy.compute_delay(1), Duration::from_millis(20));
        assert_eq!(policy.compute_delay(2), Duration::from_millis(40));
        assert_eq!(policy.compute_delay(3), Duration::from_millis(50));
    }

    #[test]
    fn deserializes_with_defaults() {
        let policy: BackoffPolicy = ron::from_str("(max_delay_ms: 500)").unwrap();
        assert_eq!(policy.base_delay_ms, 100);
        assert_eq!(policy.max_delay_ms, 500);
    }
}
