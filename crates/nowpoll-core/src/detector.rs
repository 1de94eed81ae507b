//! Change detection against the source-supplied marker.
//!
//! The remote source stamps each payload with `last_history_change`, a
//! monotonically non-decreasing value (a timestamp in practice). A payload
//! only counts as changed when its marker is strictly greater than the last
//! accepted one. A payload without a marker cannot prove no-change, so it is
//! always treated as changed and the stored marker is left untouched.

use crate::snapshot::{RawHistoryPayload, SnapshotStore};

/// The opaque monotonic marker supplied by the remote source.
pub type ChangeMarker = u64;

/// Decides changed-vs-unchanged and gates all writes to the snapshot store.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    last_marker: ChangeMarker,
}

impl ChangeDetector {
    /// Create a detector that has accepted nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The marker of the last accepted update.
    #[must_use]
    pub fn last_marker(&self) -> ChangeMarker {
        self.last_marker
    }

    /// Decide whether `payload` represents a change, advancing the marker
    /// when it does.
    pub fn evaluate(&mut self, payload: &RawHistoryPayload) -> bool {
        match payload.last_history_change {
            // No marker: conservatively assume change, keep the marker as-is
            // so later marker-less payloads stay "changed" too.
            None => true,
            Some(marker) if marker > self.last_marker => {
                self.last_marker = marker;
                true
            }
            Some(_) => false,
        }
    }

    /// Evaluate `payload` and, only if it changed, normalize it into `store`.
    ///
    /// This is the sole write path to the store: an unchanged payload leaves
    /// the previous snapshot fully intact.
    pub fn accept(&mut self, payload: RawHistoryPayload, store: &mut SnapshotStore) -> bool {
        let changed = self.evaluate(&payload);
        if changed {
            store.replace(payload.normalize());
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RawHistoryPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn increasing_marker_is_a_change() {
        let mut detector = ChangeDetector::new();

        assert!(detector.evaluate(&payload(json!({ "last_history_change": 1 }))));
        assert!(detector.evaluate(&payload(json!({ "last_history_change": 2 }))));
        assert_eq!(detector.last_marker(), 2);
    }

    #[test]
    fn non_increasing_marker_is_unchanged() {
        let mut detector = ChangeDetector::new();

        assert!(detector.evaluate(&payload(json!({ "last_history_change": 2 }))));
        assert!(!detector.evaluate(&payload(json!({ "last_history_change": 2 }))));
        assert!(!detector.evaluate(&payload(json!({ "last_history_change": 1 }))));
        assert_eq!(detector.last_marker(), 2);
    }

    #[test]
    fn zero_marker_on_first_poll_is_unchanged() {
        // The initial marker is 0, so a source reporting 0 has not advanced.
        let mut detector = ChangeDetector::new();
        assert!(!detector.evaluate(&payload(json!({ "last_history_change": 0 }))));
    }

    #[test]
    fn absent_marker_is_always_a_change() {
        let mut detector = ChangeDetector::new();

        assert!(detector.evaluate(&payload(json!({}))));
        assert_eq!(detector.last_marker(), 0);

        // A real marker in between does not stop later marker-less payloads
        // from counting as changed.
        assert!(detector.evaluate(&payload(json!({ "last_history_change": 5 }))));
        assert!(detector.evaluate(&payload(json!({}))));
        assert_eq!(detector.last_marker(), 5);
    }

    #[test]
    fn accept_updates_store_only_on_change() {
        let mut detector = ChangeDetector::new();
        let mut store = SnapshotStore::new();

        let changed = detector.accept(
            payload(json!({
                "last_history_change": 10,
                "history": [{ "artist": "A", "title": "T1" }],
                "is_playing": true
            })),
            &mut store,
        );
        assert!(changed);
        assert_eq!(store.get().entries.len(), 1);
        assert!(store.get().is_playing);

        // Stale marker: snapshot must stay exactly as it was.
        let changed = detector.accept(
            payload(json!({
                "last_history_change": 5,
                "history": [{ "artist": "X", "title": "Y" }, { "artist": "Z", "title": "W" }]
            })),
            &mut store,
        );
        assert!(!changed);
        assert_eq!(store.get().entries.len(), 1);
        assert_eq!(store.get().entries[0].artist, "A");
    }
}
