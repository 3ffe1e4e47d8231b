// In-process `CollectionSource`, used by the probe binary and tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use crate::record::RawRecord;
use crate::source::{CollectionSource, SnapshotListener, SourceError};

#[derive(Default)]
struct Inner {
    // Insertion order is the snapshot order.
    collections: HashMap<String, Vec<RawRecord>>,
    listeners: HashMap<u64, (String, Arc<SnapshotListener>)>,
    delete_calls: Vec<(String, String)>,
    unsubscribe_calls: Vec<u64>,
    delete_failures: VecDeque<SourceError>,
    subscribe_failure: Option<SourceError>,
}

impl Inner {
    // Called with the lock held so pushes leave in the order changes were applied.
    fn notify(&self, collection: &str) {
        let records = self.collections.get(collection).cloned().unwrap_or_default();
        for (name, listener) in self.listeners.values() {
            if name == collection {
                listener.on_snapshot(records.clone());
            }
        }
    }
}

#[derive(Default)]
struct DeleteGate {
    held: Mutex<bool>,
    cv: Condvar,
}

/// Thread-safe document collections with live snapshot pushes.
#[derive(Clone, Default)]
pub struct MemoryCollection {
    inner: Arc<Mutex<Inner>>,
    gate: Arc<DeleteGate>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(collection: &str, records: Vec<RawRecord>) -> Self {
        let this = Self::new();
        this.lock().collections.insert(collection.to_string(), records);
        this
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    /// Create or replace a record (as an external writer would) and push a snapshot.
    pub fn upsert(&self, collection: &str, record: RawRecord) {
        let mut inner = self.lock();
        let docs = inner.collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => docs.push(record),
        }
        inner.notify(collection);
    }

    /// Remove a record outside of `delete_record` (no call is recorded).
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let mut inner = self.lock();
        let removed = remove_from(&mut inner, collection, id);
        if removed {
            inner.notify(collection);
        }
        removed
    }

    pub fn records(&self, collection: &str) -> Vec<RawRecord> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Queue an error for the next `delete_record` call.
    pub fn fail_next_delete(&self, err: SourceError) {
        self.lock().delete_failures.push_back(err);
    }

    pub fn fail_subscribe(&self, err: SourceError) {
        self.lock().subscribe_failure = Some(err);
    }

    /// Report a subscription error to every listener of `collection`.
    pub fn push_error(&self, collection: &str, message: &str) {
        let inner = self.lock();
        for (name, listener) in inner.listeners.values() {
            if name == collection {
                listener.on_error(message.to_string());
            }
        }
    }

    /// Push the current snapshot again without changing anything.
    pub fn resend(&self, collection: &str) {
        self.lock().notify(collection);
    }

    /// Block `delete_record` calls until `release_deletes`.
    pub fn hold_deletes(&self) {
        *lock_flag(&self.gate.held) = true;
    }

    pub fn release_deletes(&self) {
        *lock_flag(&self.gate.held) = false;
        self.gate.cv.notify_all();
    }

    pub fn delete_calls(&self) -> Vec<(String, String)> {
        self.lock().delete_calls.clone()
    }

    pub fn unsubscribe_calls(&self) -> Vec<u64> {
        self.lock().unsubscribe_calls.clone()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.lock().listeners.len()
    }

    fn wait_for_gate(&self) {
        let mut held = lock_flag(&self.gate.held);
        while *held {
            held = match self.gate.cv.wait(held) {
                Ok(g) => g,
                Err(poison) => poison.into_inner(),
            };
        }
    }
}

fn lock_flag(m: &Mutex<bool>) -> MutexGuard<'_, bool> {
    match m.lock() {
        Ok(g) => g,
        Err(poison) => poison.into_inner(),
    }
}

fn remove_from(inner: &mut Inner, collection: &str, id: &str) -> bool {
    let Some(docs) = inner.collections.get_mut(collection) else {
        return false;
    };
    let before = docs.len();
    docs.retain(|r| r.id != id);
    docs.len() != before
}

impl CollectionSource for MemoryCollection {
    fn subscribe(
        &self,
        collection: String,
        subscription_id: u64,
        listener: Arc<SnapshotListener>,
    ) -> Result<(), SourceError> {
        let mut inner = self.lock();
        if let Some(err) = inner.subscribe_failure.clone() {
            return Err(err);
        }
        let records = inner.collections.get(&collection).cloned().unwrap_or_default();
        listener.on_snapshot(records);
        inner
            .listeners
            .insert(subscription_id, (collection, listener));
        Ok(())
    }

    fn unsubscribe(&self, subscription_id: u64) {
        let mut inner = self.lock();
        inner.unsubscribe_calls.push(subscription_id);
        inner.listeners.remove(&subscription_id);
    }

    fn delete_record(&self, collection: String, record_id: String) -> Result<(), SourceError> {
        self.wait_for_gate();
        let mut inner = self.lock();
        inner
            .delete_calls
            .push((collection.clone(), record_id.clone()));
        if let Some(err) = inner.delete_failures.pop_front() {
            return Err(err);
        }
        if !remove_from(&mut inner, &collection, &record_id) {
            return Err(SourceError::NotFound { id: record_id });
        }
        inner.notify(&collection);
        Ok(())
    }
}
