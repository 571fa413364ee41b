//! Types shared by every courier crate.
//!
//! - [`message`]: the logical message and its idempotency key
//! - [`status`]: immutable dispatch outcome records
//! - [`logging`]: subscriber initialisation and target-tagged log macros

pub mod logging;
pub mod message;
pub mod status;

pub use message::{IdempotencyKey, Message};
pub use status::{DispatchOutcome, DispatchStatus};
pub use tracing;
