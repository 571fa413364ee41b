//! Append-only record of dispatch outcomes.

use courier_common::DispatchStatus;
use parking_lot::RwLock;

/// Ordered, append-only sequence of [`DispatchStatus`] records.
///
/// Records are never deduplicated, compacted or removed for the lifetime of
/// the ledger. Readers always receive a snapshot.
#[derive(Debug, Default)]
pub struct StatusLedger {
    entries: RwLock<Vec<DispatchStatus>>,
}

impl StatusLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: DispatchStatus) {
        self.entries.write().push(entry);
    }

    /// Snapshot of every record in insertion order
    #[must_use]
    pub fn all(&self) -> Vec<DispatchStatus> {
        self.entries.read().clone()
    }

    /// Snapshot of the records for a single recipient, in insertion order
    #[must_use]
    pub fn for_recipient(&self, recipient: &str) -> Vec<DispatchStatus> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.recipient == recipient)
            .cloned()
            .collect()
    }

    /// The most recently appended record
    #[must_use]
    pub fn latest(&self) -> Option<DispatchStatus> {
        self.entries.read().last().cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use courier_common::Message;
    use pretty_assertions::assert_eq;

    use super::*;

    fn status(recipient: &str, provider: &str) -> DispatchStatus {
        DispatchStatus::new(&Message::new(recipient, "Subject", "Body"), 3, true, provider)
    }

    #[test]
    fn preserves_insertion_order() {
        let ledger = StatusLedger::new();
        ledger.record(status("a@example.com", "First"));
        ledger.record(status("b@example.com", "Second"));
        ledger.record(status("a@example.com", "Third"));

        let providers: Vec<_> = ledger.all().into_iter().map(|s| s.provider).collect();
        assert_eq!(providers, ["First", "Second", "Third"]);
        assert_eq!(ledger.latest().map(|s| s.provider).as_deref(), Some("Third"));
    }

    #[test]
    fn snapshots_are_detached() {
        let ledger = StatusLedger::new();
        ledger.record(status("a@example.com", "First"));

        let snapshot = ledger.all();
        ledger.record(status("a@example.com", "Second"));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn identical_records_are_kept() {
        let ledger = StatusLedger::new();
        let entry = status("a@example.com", "First");
        ledger.record(entry.clone());
        ledger.record(entry);

        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn filters_by_recipient() {
        let ledger = StatusLedger::new();
        assert!(ledger.is_empty());

        ledger.record(status("a@example.com", "First"));
        ledger.record(status("b@example.com", "Second"));
        ledger.record(status("a@example.com", "Third"));

        let for_a: Vec<_> = ledger
            .for_recipient("a@example.com")
            .into_iter()
            .map(|s| s.provider)
            .collect();
        assert_eq!(for_a, ["First", "Third"]);
    }
}
