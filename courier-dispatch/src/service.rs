//! Read-only query surface over a dispatch engine
//!
//! Lets outer shells (CLI, control interfaces) inspect dispatch outcomes
//! without depending on the concrete engine, and makes them mockable in tests.

use courier_common::DispatchStatus;

/// Service trait for querying dispatch state
///
/// # Example
///
/// ```rust,ignore
/// fn failures(service: &dyn DispatchQueryService) -> usize {
///     service.statuses().iter().filter(|s| !s.success).count()
/// }
/// ```
pub trait DispatchQueryService: Send + Sync {
    /// Snapshot of every status record in insertion order
    fn statuses(&self) -> Vec<DispatchStatus>;

    /// Number of status records written so far
    fn status_count(&self) -> usize;

    /// Snapshot of the status records for a single recipient
    fn statuses_for(&self, recipient: &str) -> Vec<DispatchStatus>;

    /// Number of recipients currently tracked by the rate limiter
    fn tracked_recipients(&self) -> usize;
}
