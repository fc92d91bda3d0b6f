//! Mutation notifications for settings stores
//!
//! Every store emits a [`StoreEvent`] after a successful create, update or
//! delete. Observers run synchronously on the mutating thread, so by the time
//! the mutating call returns every observer has seen the change.
//!
//! Stores mutate through [`StoreEvents::commit`], which holds a commit lock
//! across the mutation and its notification. Observers therefore see events
//! in the order the store applied them, and a cache written from those events
//! ends with the same last value as the store.

use super::SettingRecord;
use crate::error::Result;
use crate::sync::{MutexExt, RwLockExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Type alias for a store observer
pub type StoreCallback = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// What happened to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Created,
    Updated,
    Deleted,
}

/// A completed store mutation
#[derive(Debug, Clone, PartialEq)]
pub struct StoreEvent {
    pub kind: MutationKind,
    /// The record after the mutation (or as it was, for deletes)
    pub record: SettingRecord,
}

impl StoreEvent {
    pub fn created(record: SettingRecord) -> Self {
        Self {
            kind: MutationKind::Created,
            record,
        }
    }

    pub fn updated(record: SettingRecord) -> Self {
        Self {
            kind: MutationKind::Updated,
            record,
        }
    }

    pub fn deleted(record: SettingRecord) -> Self {
        Self {
            kind: MutationKind::Deleted,
            record,
        }
    }

    /// Key of the mutated setting
    pub fn key(&self) -> &str {
        &self.record.key
    }
}

/// Handle returned by [`StoreEvents::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer registry owned by a store
pub struct StoreEvents {
    /// Global observers (called for every mutation)
    subscribers: RwLock<Vec<(SubscriptionId, StoreCallback)>>,

    /// Per-key observers
    key_watchers: RwLock<HashMap<String, Vec<StoreCallback>>>,

    next_id: AtomicU64,

    /// Serializes mutation + notification
    commit_lock: Mutex<()>,
}

impl StoreEvents {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            key_watchers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            commit_lock: Mutex::new(()),
        }
    }

    /// Run a store mutation and deliver its events before any other commit
    /// starts.
    ///
    /// `mutation` returns its outcome and the events it produced. Nothing is
    /// delivered when it fails. Observers must not mutate the same store from
    /// inside a callback; reading it is fine.
    ///
    /// # Errors
    ///
    /// Returns whatever `mutation` returns.
    pub fn commit<R>(&self, mutation: impl FnOnce() -> Result<(R, Vec<StoreEvent>)>) -> Result<R> {
        self.exclusive(|| -> Result<R> {
            let (outcome, events) = mutation()?;
            for event in &events {
                self.notify(event);
            }
            Ok(outcome)
        })
    }

    /// Run `f` with no commit in progress.
    ///
    /// Readers that copy store state into a cache do so here, so a concurrent
    /// commit cannot land between their read and their cache write.
    pub fn exclusive<R>(&self, f: impl FnOnce() -> R) -> R {
        let _commit = self.commit_lock.lock_recovered();
        f()
    }

    /// Register an observer for every mutation
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .write_recovered()
            .push((id, Arc::new(callback)));
        id
    }

    /// Remove a global observer. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut guard = self.subscribers.write_recovered();
        let before = guard.len();
        guard.retain(|(existing, _)| *existing != id);
        guard.len() != before
    }

    /// Register an observer for a single setting key
    pub fn watch<F>(&self, key: &str, callback: F)
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        self.key_watchers
            .write_recovered()
            .entry(key.to_string())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Remove all observers for a specific key
    pub fn unwatch(&self, key: &str) {
        self.key_watchers.write_recovered().remove(key);
    }

    /// Deliver an event to global observers, then to watchers of its key.
    ///
    /// Callbacks are copied out before running so an observer may register
    /// further observers or read the store without deadlocking.
    pub fn notify(&self, event: &StoreEvent) {
        let global: Vec<StoreCallback> = self
            .subscribers
            .read_recovered()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();
        for callback in global {
            callback(event);
        }

        let watchers = self
            .key_watchers
            .read_recovered()
            .get(event.key())
            .cloned()
            .unwrap_or_default();
        for callback in watchers {
            callback(event);
        }
    }

    /// Number of registered observers (global and per-key)
    pub fn listener_count(&self) -> usize {
        let global = self.subscribers.read_recovered().len();
        let keyed: usize = self.key_watchers.read_recovered().values().map(Vec::len).sum();
        global + keyed
    }

    /// Clear all observers
    pub fn clear(&self) {
        self.subscribers.write_recovered().clear();
        self.key_watchers.write_recovered().clear();
    }
}

impl Default for StoreEvents {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;
    use std::sync::atomic::AtomicUsize;

    fn record(key: &str) -> SettingRecord {
        SettingRecord::new(key, "1", ValueType::Int)
    }

    #[test]
    fn test_global_subscriber() {
        let events = StoreEvents::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        events.subscribe(move |_event| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        events.notify(&StoreEvent::created(record("a")));
        events.notify(&StoreEvent::deleted(record("b")));

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_key_watcher() {
        let events = StoreEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        events.watch("theme", move |event| {
            seen_clone.lock().unwrap().push(event.kind);
        });

        events.notify(&StoreEvent::updated(record("theme")));
        events.notify(&StoreEvent::updated(record("language")));
        events.notify(&StoreEvent::deleted(record("theme")));

        assert_eq!(
            *seen.lock().unwrap(),
            vec![MutationKind::Updated, MutationKind::Deleted]
        );

        events.unwatch("theme");
        events.notify(&StoreEvent::updated(record("theme")));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let events = StoreEvents::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let id = events.subscribe(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(events.listener_count(), 1);

        assert!(events.unsubscribe(id));
        assert!(!events.unsubscribe(id));

        events.notify(&StoreEvent::created(record("a")));
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_observer_can_subscribe_during_notify() {
        let events = Arc::new(StoreEvents::new());
        let events_clone = events.clone();

        events.subscribe(move |_| {
            events_clone.subscribe(|_| {});
        });

        events.notify(&StoreEvent::created(record("a")));
        assert_eq!(events.listener_count(), 2);

        events.clear();
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn test_commit_delivers_only_on_success() {
        let events = StoreEvents::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        events.subscribe(move |event| {
            seen_clone.lock().unwrap().push(event.key().to_string());
        });

        let outcome = events
            .commit(|| {
                Ok((
                    7,
                    vec![
                        StoreEvent::created(record("a")),
                        StoreEvent::updated(record("b")),
                    ],
                ))
            })
            .unwrap();
        assert_eq!(outcome, 7);

        let failed: Result<()> =
            events.commit(|| Err(crate::error::Error::KeyNotFound("c".into())));
        assert!(failed.is_err());

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_commit_waits_for_exclusive_section() {
        let events = Arc::new(StoreEvents::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let writer = events.exclusive(|| {
            let events = events.clone();
            let order_clone = order.clone();
            let handle = std::thread::spawn(move || {
                events
                    .commit(|| {
                        order_clone.lock().unwrap().push("commit");
                        Ok(((), Vec::new()))
                    })
                    .unwrap();
            });
            std::thread::sleep(std::time::Duration::from_millis(50));
            order.lock().unwrap().push("exclusive");
            handle
        });
        writer.join().unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["exclusive", "commit"]);
    }
}
