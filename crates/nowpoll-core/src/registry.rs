//! Observer registration and fan-out.
//!
//! The registry is an arena: observer ids are dense indices handed out in
//! registration order, and removal clears the slot without compacting, so an
//! id issued once stays valid (resolving to "already removed") for the
//! registry's whole lifetime.

use crate::snapshot::HistorySnapshot;

/// Error type observers may return from a notification.
pub type ObserverFailure = Box<dyn std::error::Error + Send + Sync>;

/// A registered observer callback.
///
/// Invoked once per poll cycle with the change flag and the current
/// snapshot. A returned error is logged and ignored; it never interrupts
/// fan-out to the remaining observers.
pub type ObserverCallback = Box<dyn FnMut(bool, &HistorySnapshot) -> Result<(), ObserverFailure> + Send>;

/// Stable identifier for a registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

impl ObserverId {
    /// The underlying slot index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Arena of observer callbacks with stable ids and ordered fan-out.
#[derive(Default)]
pub struct ObserverRegistry {
    slots: Vec<Option<ObserverCallback>>,
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry")
            .field("slots", &self.slots.len())
            .field("active", &self.active_count())
            .finish()
    }
}

impl ObserverRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback and return its id.
    ///
    /// Ids start at 0 and grow densely; they are never reused.
    pub fn register(&mut self, callback: ObserverCallback) -> ObserverId {
        let id = ObserverId(self.slots.len());
        self.slots.push(Some(callback));
        tracing::debug!(observer = %id, "Observer registered");
        id
    }

    /// Remove a callback.
    ///
    /// Returns `true` if the slot was occupied; `false` for an out-of-range
    /// id or one that was already removed. Removal never shifts other ids.
    pub fn deregister(&mut self, id: ObserverId) -> bool {
        match self.slots.get_mut(id.index()) {
            Some(slot @ Some(_)) => {
                *slot = None;
                tracing::debug!(observer = %id, "Observer deregistered");
                true
            }
            _ => false,
        }
    }

    /// Number of live (non-removed) observers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no observer has ever been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Invoke every live callback, in registration order.
    ///
    /// A failing callback is logged and skipped over; it cannot prevent the
    /// remaining observers from being notified. Returns how many observers
    /// were invoked.
    pub fn notify_all(&mut self, changed: bool, snapshot: &HistorySnapshot) -> usize {
        let mut notified = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(callback) = slot else { continue };
            notified += 1;
            if let Err(err) = callback(changed, snapshot) {
                tracing::warn!(observer = index, error = %err, "Observer callback failed");
            }
        }
        notified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn noop() -> ObserverCallback {
        Box::new(|_: bool, _: &HistorySnapshot| Ok(()))
    }

    fn recorder(tag: &'static str, calls: &Arc<Mutex<Vec<&'static str>>>) -> ObserverCallback {
        let calls = Arc::clone(calls);
        Box::new(move |_: bool, _: &HistorySnapshot| {
            calls.lock().unwrap().push(tag);
            Ok(())
        })
    }

    #[test]
    fn ids_are_dense_and_ordered() {
        let mut registry = ObserverRegistry::new();

        let a = registry.register(noop());
        let b = registry.register(noop());
        let c = registry.register(noop());

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn is_empty_only_before_first_registration() {
        let mut registry = ObserverRegistry::new();
        assert!(registry.is_empty());

        let id = registry.register(noop());
        assert!(!registry.is_empty());

        // The arena never shrinks: removal leaves the id space intact.
        assert!(registry.deregister(id));
        assert!(!registry.is_empty());
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn deregister_is_idempotent() {
        let mut registry = ObserverRegistry::new();
        let id = registry.register(noop());

        assert!(registry.deregister(id));
        assert!(!registry.deregister(id));
        assert!(!registry.deregister(ObserverId(99)));
    }

    #[test]
    fn ids_survive_removal_of_earlier_slots() {
        let mut registry = ObserverRegistry::new();
        let a = registry.register(noop());
        let b = registry.register(noop());

        assert!(registry.deregister(a));

        // b's slot is untouched, and new ids keep growing past it.
        let c = registry.register(noop());
        assert_eq!(c.index(), 2);
        assert!(registry.deregister(b));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn fan_out_runs_in_registration_order() {
        let mut registry = ObserverRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            registry.register(Box::new(move |changed: bool, _: &HistorySnapshot| {
                order.lock().unwrap().push((tag, changed));
                Ok(())
            }));
        }

        let notified = registry.notify_all(true, &HistorySnapshot::default());

        assert_eq!(notified, 3);
        assert_eq!(
            *order.lock().unwrap(),
            vec![("first", true), ("second", true), ("third", true)]
        );
    }

    #[test]
    fn failing_observer_does_not_break_fan_out() {
        let mut registry = ObserverRegistry::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        registry.register(recorder("before", &calls));
        {
            let calls = Arc::clone(&calls);
            registry.register(Box::new(move |_: bool, _: &HistorySnapshot| {
                calls.lock().unwrap().push("failing");
                Err("observer blew up".into())
            }));
        }
        registry.register(recorder("after", &calls));

        let notified = registry.notify_all(false, &HistorySnapshot::default());

        assert_eq!(notified, 3);
        assert_eq!(*calls.lock().unwrap(), vec!["before", "failing", "after"]);
    }

    #[test]
    fn removed_observers_are_skipped() {
        let mut registry = ObserverRegistry::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        let a = registry.register(recorder("a", &calls));
        registry.register(recorder("b", &calls));
        assert!(registry.deregister(a));

        let notified = registry.notify_all(true, &HistorySnapshot::default());

        assert_eq!(notified, 1);
        assert_eq!(*calls.lock().unwrap(), vec!["b"]);
    }
}
