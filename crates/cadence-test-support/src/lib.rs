//! Shared test doubles and utilities for the Cadence playback engine.

mod clock;
mod store;

pub use clock::{FixedClock, ManualClock};
pub use store::{FailingSessionStore, RecordingSessionStore, StoreCall};
