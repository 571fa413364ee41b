//! Policy abstractions for dispatch operations.
//!
//! Policies are plain data with pure methods, kept apart from the engine so
//! they can be tested without providers or a runtime.
//!
//! - [`BackoffPolicy`]: delay between a failed attempt and the next one
//! - [`RetryPolicy`]: per-provider attempt budget and how attempts are reported

pub mod backoff;
pub mod retry;

pub use backoff::BackoffPolicy;
pub use retry::{AttemptsReporting, RetryPolicy};
