//! Session-scoped progress persistence.
//!
//! Saves the current message index under `narrative-{phase_key}` as
//! `{"currentMessageIndex": n, "timestamp": epoch_ms}` and restores it when a
//! new engine starts for the same phase, unless the record is stale, malformed
//! or points outside the queue. Rejected records are removed.

use std::sync::Arc;

use cadence_core::clock::Clock;
use cadence_core::error::DomainError;
use cadence_core::store::SessionStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefix shared by every progress key.
pub const KEY_PREFIX: &str = "narrative-";

/// The serialized shape of saved progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Index of the message that was current.
    pub current_message_index: usize,
    /// When the record was written, in milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// What `ProgressStore::restore` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A fresh, in-range record.
    Restored(usize),
    /// No record for this phase.
    Missing,
    /// The record did not parse; it was removed.
    Malformed,
    /// The record was older than the staleness window; it was removed.
    Stale {
        /// Age of the record in milliseconds.
        age_ms: u64,
    },
    /// The record pointed past the end of the queue; it was removed.
    OutOfRange {
        /// The saved index.
        index: usize,
    },
    /// The store could not be read.
    Unavailable,
}

impl RestoreOutcome {
    /// The index to resume at, if any.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Restored(index) => Some(*index),
            _ => None,
        }
    }
}

/// Builds the store key for `phase_key`.
#[must_use]
pub fn key_for(phase_key: &str) -> String {
    format!("{KEY_PREFIX}{phase_key}")
}

/// Removes every progress record from `store`, whatever its phase. Returns how
/// many were removed.
///
/// # Errors
///
/// Returns `DomainError::Storage` if the store cannot be listed or written.
pub fn purge_all(store: &dyn SessionStore) -> Result<usize, DomainError> {
    let mut removed = 0;
    for key in store.keys()? {
        if key.starts_with(KEY_PREFIX) {
            store.remove(&key)?;
            removed += 1;
        }
    }
    debug!(removed, "purged all narrative progress records");
    Ok(removed)
}

/// Reads and writes the progress record for one phase.
#[derive(Clone)]
pub struct ProgressStore {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    key: String,
    staleness_ms: u64,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("key", &self.key)
            .field("staleness_ms", &self.staleness_ms)
            .finish_non_exhaustive()
    }
}

impl ProgressStore {
    /// Creates a progress store for `phase_key`.
    #[must_use]
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        phase_key: &str,
        staleness_ms: u64,
    ) -> Self {
        Self {
            store,
            clock,
            key: key_for(phase_key),
            staleness_ms,
        }
    }

    /// The store key this instance uses.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes `index` with the current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Serialization` if the record cannot be encoded,
    /// or `DomainError::Storage` if the store rejects the write.
    pub fn save(&self, index: usize) -> Result<(), DomainError> {
        let record = ProgressRecord {
            current_message_index: index,
            timestamp: self.clock.epoch_millis(),
        };
        let value = serde_json::to_string(&record)?;
        self.store.set(&self.key, value)
    }

    /// Removes the record for this phase.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the store rejects the removal.
    pub fn clear(&self) -> Result<(), DomainError> {
        self.store.remove(&self.key)
    }

    /// Looks for a usable record for a queue of `message_count` messages.
    /// Anything unusable is removed from the store.
    pub fn restore(&self, message_count: usize) -> RestoreOutcome {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return RestoreOutcome::Missing,
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read saved progress");
                return RestoreOutcome::Unavailable;
            }
        };

        let outcome = match serde_json::from_str::<ProgressRecord>(&raw) {
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding malformed saved progress");
                RestoreOutcome::Malformed
            }
            Ok(record) => self.judge(record, message_count),
        };

        if outcome.index().is_none() {
            if let Err(e) = self.clear() {
                warn!(key = %self.key, error = %e, "could not remove rejected progress");
            }
        }
        outcome
    }

    fn judge(&self, record: ProgressRecord, message_count: usize) -> RestoreOutcome {
        let age_ms = u64::try_from(self.clock.epoch_millis().saturating_sub(record.timestamp))
            .unwrap_or(0);
        if age_ms > self.staleness_ms {
            debug!(key = %self.key, age_ms, "discarding stale saved progress");
            return RestoreOutcome::Stale { age_ms };
        }
        if record.current_message_index >= message_count {
            debug!(
                key = %self.key,
                index = record.current_message_index,
                message_count,
                "discarding out-of-range saved progress"
            );
            return RestoreOutcome::OutOfRange {
                index: record.current_message_index,
            };
        }
        RestoreOutcome::Restored(record.current_message_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::store::MemorySessionStore;
    use cadence_test_support::{
        FailingSessionStore, FixedClock, ManualClock, RecordingSessionStore,
    };
    use chrono::Duration;

    const STALENESS_MS: u64 = 5 * 60 * 1_000;

    fn record_json(index: i64, timestamp: i64) -> String {
        format!(r#"{{"currentMessageIndex":{index},"timestamp":{timestamp}}}"#)
    }

    #[test]
    fn test_key_uses_narrative_prefix() {
        assert_eq!(key_for("test-phase"), "narrative-test-phase");
    }

    #[test]
    fn test_save_writes_camel_case_record() {
        // Arrange
        let clock = FixedClock::default_instant();
        let store = Arc::new(RecordingSessionStore::new());
        let progress = ProgressStore::new(store.clone(), Arc::new(clock), "intro", STALENESS_MS);

        // Act
        progress.save(2).unwrap();

        // Assert
        let writes = store.writes_to("narrative-intro");
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0],
            record_json(2, clock.0.timestamp_millis()),
        );
    }

    #[test]
    fn test_restore_within_window_returns_index() {
        let clock = Arc::new(ManualClock::new(FixedClock::default_instant().0));
        let store = Arc::new(MemorySessionStore::new());
        let progress = ProgressStore::new(store, clock.clone(), "intro", STALENESS_MS);
        progress.save(1).unwrap();

        clock.advance(Duration::minutes(5));

        assert_eq!(progress.restore(3), RestoreOutcome::Restored(1));
    }

    #[test]
    fn test_restore_stale_record_removes_it() {
        let clock = Arc::new(ManualClock::new(FixedClock::default_instant().0));
        let store = Arc::new(RecordingSessionStore::new());
        let progress = ProgressStore::new(store.clone(), clock.clone(), "intro", STALENESS_MS);
        progress.save(2).unwrap();

        clock.advance(Duration::minutes(10));
        let outcome = progress.restore(3);

        assert_eq!(outcome, RestoreOutcome::Stale { age_ms: 600_000 });
        assert_eq!(store.removed_keys(), vec!["narrative-intro".to_owned()]);
        assert!(store.get("narrative-intro").unwrap().is_none());
    }

    #[test]
    fn test_restore_malformed_record_removes_it() {
        let store = Arc::new(RecordingSessionStore::with_entry(
            "narrative-intro",
            "invalid-json",
        ));
        let progress = ProgressStore::new(
            store.clone(),
            Arc::new(FixedClock::default_instant()),
            "intro",
            STALENESS_MS,
        );

        let outcome = progress.restore(3);

        assert_eq!(outcome, RestoreOutcome::Malformed);
        assert_eq!(store.removed_keys(), vec!["narrative-intro".to_owned()]);
    }

    #[test]
    fn test_restore_record_missing_fields_is_malformed() {
        let store = Arc::new(RecordingSessionStore::with_entry(
            "narrative-intro",
            r#"{"currentMessageIndex":1}"#,
        ));
        let progress = ProgressStore::new(
            store,
            Arc::new(FixedClock::default_instant()),
            "intro",
            STALENESS_MS,
        );

        assert_eq!(progress.restore(3), RestoreOutcome::Malformed);
    }

    #[test]
    fn test_restore_out_of_range_index_removes_it() {
        let clock = FixedClock::default_instant();
        let store = Arc::new(RecordingSessionStore::with_entry(
            "narrative-intro",
            &record_json(7, clock.0.timestamp_millis()),
        ));
        let progress = ProgressStore::new(store.clone(), Arc::new(clock), "intro", STALENESS_MS);

        assert_eq!(progress.restore(3), RestoreOutcome::OutOfRange { index: 7 });
        assert_eq!(store.removed_keys(), vec!["narrative-intro".to_owned()]);
    }

    #[test]
    fn test_restore_future_timestamp_counts_as_fresh() {
        let clock = FixedClock::default_instant();
        let store = Arc::new(RecordingSessionStore::with_entry(
            "narrative-intro",
            &record_json(1, clock.0.timestamp_millis() + 60_000),
        ));
        let progress = ProgressStore::new(store, Arc::new(clock), "intro", STALENESS_MS);

        assert_eq!(progress.restore(3), RestoreOutcome::Restored(1));
    }

    #[test]
    fn test_restore_with_failing_store_is_unavailable() {
        let progress = ProgressStore::new(
            Arc::new(FailingSessionStore),
            Arc::new(FixedClock::default_instant()),
            "intro",
            STALENESS_MS,
        );

        assert_eq!(progress.restore(3), RestoreOutcome::Unavailable);
        assert!(progress.save(0).is_err());
    }

    #[test]
    fn test_purge_all_only_removes_narrative_keys() {
        let store = MemorySessionStore::new();
        store.set("narrative-intro", "{}".to_owned()).unwrap();
        store.set("narrative-outro", "{}".to_owned()).unwrap();
        store.set("toolkit-unlocked", "true".to_owned()).unwrap();

        let removed = purge_all(&store).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.keys().unwrap(), vec!["toolkit-unlocked".to_owned()]);
    }
}
