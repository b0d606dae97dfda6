//! Session-scoped key/value store abstraction.
//!
//! Mirrors the small surface of a browser session store: string keys, string
//! values, and no expiry of its own. Staleness rules live with the callers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::DomainError;

/// Key/value store whose lifetime is one user session.
pub trait SessionStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backing store cannot be written.
    fn set(&self, key: &str, value: String) -> Result<(), DomainError>;

    /// Removes `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), DomainError>;

    /// Lists every key currently held.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the backing store cannot be read.
    fn keys(&self) -> Result<Vec<String>, DomainError>;
}

/// In-memory store that lives as long as the process does.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, String>>, DomainError> {
        self.entries
            .lock()
            .map_err(|e| DomainError::Storage(format!("session store lock poisoned: {e}")))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), DomainError> {
        self.lock()?.insert(key.to_owned(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, DomainError> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
