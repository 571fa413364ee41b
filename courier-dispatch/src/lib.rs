//! Message dispatch core
//!
//! This crate turns a logical message and a ranked list of delivery providers
//! into a single delivery outcome:
//! - Per-recipient fixed-window rate limiting
//! - Idempotent suppression of already-delivered messages
//! - Ordered provider fallback with bounded, exponentially backed-off retries
//! - An append-only ledger of every dispatch outcome

mod config;
mod engine;
mod error;
mod idempotency;
mod ledger;
pub mod policy;
mod provider;
mod rate_limiter;
mod service;

pub use config::DispatchConfig;
pub use courier_common::{DispatchOutcome, DispatchStatus, IdempotencyKey, Message};
pub use engine::DispatchEngine;
pub use error::{DispatchError, ProviderError};
pub use idempotency::{IdempotencyLedger, KeyGuard};
pub use ledger::StatusLedger;
pub use policy::{AttemptsReporting, BackoffPolicy, RetryPolicy};
pub use provider::{DeliveryProvider, SharedProvider};
pub use rate_limiter::{RateLimitConfig, RateLimitStats, RateLimiter};
pub use service::DispatchQueryService;
