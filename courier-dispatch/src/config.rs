//! Dispatch engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    DispatchError, RateLimitConfig,
    policy::{AttemptsReporting, BackoffPolicy, RetryPolicy},
};

/// Configuration for a [`DispatchEngine`](crate::DispatchEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Attempts made against each provider before falling back to the next.
    ///
    /// Default: 3
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,

    /// Per-recipient admission control
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Delay between a failed attempt and the next one
    #[serde(default)]
    pub backoff: BackoffPolicy,

    /// What status records report in their `attempts` field
    ///
    /// Default: `Configured`
    #[serde(default)]
    pub attempts_reporting: AttemptsReporting,

    /// Upper bound on a single provider call, in milliseconds.
    ///
    /// Default: none, a hung provider stalls its message indefinitely
    #[serde(default)]
    pub attempt_timeout_ms: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            retry_limit: default_retry_limit(),
            rate_limit: RateLimitConfig::default(),
            backoff: BackoffPolicy::default(),
            attempts_reporting: AttemptsReporting::default(),
            attempt_timeout_ms: None,
        }
    }
}

const fn default_retry_limit() -> u32 {
    3
}

impl DispatchConfig {
    /// Check every value is within its valid range.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidConfiguration`] naming the first
    /// offending field.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.retry_limit == 0 {
            return Err(invalid("retry_limit", "must be at least 1"));
        }

        if self.rate_limit.max_per_window == 0 {
            return Err(invalid("rate_limit.max_per_window", "must be at least 1"));
        }

        if self.rate_limit.window_ms == 0 {
            return Err(invalid("rate_limit.window_ms", "must be at least 1"));
        }

        if self.backoff.base_delay_ms > self.backoff.max_delay_ms {
            return Err(invalid(
                "backoff.base_delay_ms",
                format!(
                    "{} exceeds max_delay_ms {}",
                    self.backoff.base_delay_ms, self.backoff.max_delay_ms
                ),
            ));
        }

        if self.attempt_timeout_ms == Some(0) {
            return Err(invalid("attempt_timeout_ms", "must be at least 1 when set"));
        }

        Ok(())
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_limit, self.attempts_reporting)
    }

    #[must_use]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        self.attempt_timeout_ms.map(Duration::from_millis)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> DispatchError {
    DispatchError::InvalidConfiguration {
        field,
        reason: reason.into(),
    }
}
