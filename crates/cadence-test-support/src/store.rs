//! Test stores: `SessionStore` implementations for tests.

use std::sync::Mutex;

use cadence_core::error::DomainError;
use cadence_core::store::{MemorySessionStore, SessionStore};

/// A single call observed by `RecordingSessionStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    /// `get(key)`
    Get(String),
    /// `set(key, value)`
    Set(String, String),
    /// `remove(key)`
    Remove(String),
}

/// A working in-memory store that also records every call made against it.
#[derive(Debug, Default)]
pub struct RecordingSessionStore {
    inner: MemorySessionStore,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingSessionStore {
    /// Creates an empty recording store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a recording store pre-seeded with one entry. The seeding write
    /// is not recorded.
    ///
    /// # Panics
    ///
    /// Panics if the in-memory store rejects the write.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.inner.set(key, value.to_owned()).unwrap();
        store
    }

    /// Returns a snapshot of all calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Returns the keys passed to `remove`, in call order.
    pub fn removed_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Remove(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    /// Returns the values passed to `set` for `key`, in call order.
    pub fn writes_to(&self, key: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Set(k, value) if k == key => Some(value),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl SessionStore for RecordingSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.record(StoreCall::Get(key.to_owned()));
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) -> Result<(), DomainError> {
        self.record(StoreCall::Set(key.to_owned(), value.clone()));
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.record(StoreCall::Remove(key.to_owned()));
        self.inner.remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, DomainError> {
        self.inner.keys()
    }
}

/// A store that fails every operation. Useful for testing that storage
/// failures never interrupt playback.
#[derive(Debug)]
pub struct FailingSessionStore;

impl SessionStore for FailingSessionStore {
    fn get(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Storage("quota exceeded".into()))
    }

    fn set(&self, _key: &str, _value: String) -> Result<(), DomainError> {
        Err(DomainError::Storage("quota exceeded".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), DomainError> {
        Err(DomainError::Storage("quota exceeded".into()))
    }

    fn keys(&self) -> Result<Vec<String>, DomainError> {
        Err(DomainError::Storage("quota exceeded".into()))
    }
}
