//! Ledger of logical messages that have already been delivered.
//!
//! Besides the completed set, the ledger hands out per-key async locks so a
//! caller can hold a key across check, dispatch and mark. Two concurrent
//! sends of identical content are then serialized: the second one observes
//! the first one's completion instead of dispatching again. Different keys
//! never contend.

use std::sync::Arc;

use courier_common::IdempotencyKey;
use dashmap::{DashMap, DashSet};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct IdempotencyLedger {
    completed: DashSet<IdempotencyKey>,
    locks: DashMap<IdempotencyKey, Arc<Mutex<()>>>,
}

impl IdempotencyLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has_completed(&self, key: &IdempotencyKey) -> bool {
        self.completed.contains(key)
    }

    /// Mark `key` as delivered. Only ever called after a genuine success.
    pub fn mark_completed(&self, key: IdempotencyKey) {
        self.completed.insert(key);
    }

    /// Number of keys marked completed
    #[must_use]
    pub fn len(&self) -> usize {
        self.completed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Wait for exclusive use of `key`.
    ///
    /// The lock entry is dropped from the ledger when its last holder or
    /// waiter goes away.
    pub async fn lock(&self, key: &IdempotencyKey) -> KeyGuard<'_> {
        let lock = self.locks.entry(key.clone()).or_default().clone();
        let guard = lock.lock_owned().await;

        KeyGuard {
            ledger: self,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    /// Number of keys currently locked or awaited
    #[must_use]
    pub fn active_locks(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive hold on one idempotency key, released on drop.
#[derive(Debug)]
pub struct KeyGuard<'a> {
    ledger: &'a IdempotencyLedger,
    key: IdempotencyKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        // Only the map's own reference left means nobody holds or awaits it.
        self.ledger
            .locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
