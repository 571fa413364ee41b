//! Typed error handling for dispatch operations.
//!
//! Two families of error exist:
//! - [`ProviderError`]: a single delivery attempt failed. Always recovered by
//!   the engine and written into the status ledger, never returned to callers.
//! - [`DispatchError`]: the engine could not be built (invalid configuration).

use thiserror::Error;

/// Error raised by a delivery provider instead of returning an outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The transport to the backend failed (connection refused, reset, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend refused the message.
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The attempt did not complete within the configured per-attempt timeout.
    #[error("Attempt timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// Anything else the provider could not handle.
    #[error("Internal provider error: {0}")]
    Internal(String),
}

impl ProviderError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Errors surfaced when constructing a dispatch engine.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A configuration value is outside its valid range.
    #[error("Invalid configuration for {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
}
