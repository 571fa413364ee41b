//! Dispatch status records.
//!
//! One [`DispatchStatus`] is written for every terminal outcome of a send
//! and for every failed provider attempt along the way. Records are never
//! mutated after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::{IdempotencyKey, Message};

/// Provider label for a send suppressed because the message was already delivered.
pub const ALREADY_SENT: &str = "Already Sent";

/// Provider label (and error text) for a send rejected by the rate limiter.
pub const RATE_LIMIT_EXCEEDED: &str = "Rate Limit Exceeded";

/// Provider label for the terminal record written once every provider is exhausted.
pub const ALL_PROVIDERS_FAILED: &str = "All Providers Failed";

/// Coarse classification of a status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DispatchOutcome {
    /// A provider accepted the message.
    Delivered,
    /// Suppressed as a duplicate of an earlier successful delivery.
    AlreadySent,
    /// Rejected before any provider was contacted.
    RateLimited,
    /// A single provider attempt failed; dispatch continued.
    AttemptFailed,
    /// Every provider exhausted its retry budget.
    AllFailed,
}

impl DispatchOutcome {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Delivered => "delivered",
            Self::AlreadySent => "already_sent",
            Self::RateLimited => "rate_limited",
            Self::AttemptFailed => "attempt_failed",
            Self::AllFailed => "all_failed",
        }
    }
}

/// Immutable record of one dispatch outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStatus {
    pub idempotency_key: IdempotencyKey,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attempts: u32,
    pub success: bool,
    /// Name of the provider this record is attributed to, or one of the
    /// well-known labels ([`ALREADY_SENT`], [`RATE_LIMIT_EXCEEDED`],
    /// [`ALL_PROVIDERS_FAILED`]).
    pub provider: String,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl DispatchStatus {
    /// Build a record for `message`, stamped with the current time.
    pub fn new(message: &Message, attempts: u32, success: bool, provider: impl Into<String>) -> Self {
        Self {
            idempotency_key: message.idempotency_key(),
            recipient: message.recipient.clone(),
            subject: message.subject.clone(),
            body: message.body.clone(),
            attempts,
            success,
            provider: provider.into(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }

    #[must_use]
    pub fn outcome(&self) -> DispatchOutcome {
        match (self.success, self.provider.as_str()) {
            (true, ALREADY_SENT) => DispatchOutcome::AlreadySent,
            (true, _) => DispatchOutcome::Delivered,
            (false, RATE_LIMIT_EXCEEDED) => DispatchOutcome::RateLimited,
            (false, ALL_PROVIDERS_FAILED) => DispatchOutcome::AllFailed,
            (false, _) => DispatchOutcome::AttemptFailed,
        }
    }
}
