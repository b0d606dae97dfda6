//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as milliseconds since the Unix epoch.
    fn epoch_millis(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
