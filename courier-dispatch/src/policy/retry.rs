//! Retry budget per provider.

use serde::{Deserialize, Serialize};

/// What the `attempts` field of a status record reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptsReporting {
    /// Every record carries the configured retry limit, regardless of how
    /// many attempts were actually made.
    #[default]
    Configured,
    /// Every record carries the number of attempts that led to it.
    Actual,
}

/// Retry policy for a single dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts made against each provider before falling back to the next.
    pub retry_limit: u32,
    pub attempts_reporting: AttemptsReporting,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(retry_limit: u32, attempts_reporting: AttemptsReporting) -> Self {
        Self {
            retry_limit,
            attempts_reporting,
        }
    }

    /// Check if `attempt` (1-indexed) is the last one allowed on a provider.
    #[must_use]
    pub const fn is_final_attempt(&self, attempt: u32) -> bool {
        attempt >= self.retry_limit
    }

    /// Value to store in a status record's `attempts` field when `actual`
    /// attempts led to it.
    #[must_use]
    pub const fn reported_attempts(&self, actual: u32) -> u32 {
        match self.attempts_reporting {
            AttemptsReporting::Configured => self.retry_limit,
            AttemptsReporting::Actual => actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_attempt() {
        let policy = RetryPolicy::new(3, AttemptsReporting::Configured);

        assert!(!policy.is_final_attempt(1));
        assert!(!policy.is_final_attempt(2));
        assert!(policy.is_final_attempt(3));
        assert!(policy.is_final_attempt(4));
    }

    #[test]
    fn configured_reporting_always_reports_limit() {
        let policy = RetryPolicy::new(3, AttemptsReporting::Configured);

        assert_eq!(policy.reported_attempts(0), 3);
        assert_eq!(policy.reported_attempts(1), 3);
        assert_eq!(policy.reported_attempts(6), 3);
    }

    #[test]
    fn actual_reporting_passes_through() {
        let policy = RetryPolicy::new(3, AttemptsReporting::Actual);

        assert_eq!(policy.reported_attempts(0), 0);
        assert_eq!(policy.reported_attempts(2), 2);
        assert_eq!(policy.reported_attempts(6), 6);
    }
}
