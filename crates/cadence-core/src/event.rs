//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Playback session this event belongs to.
    pub session_id: Uuid,
    /// Monotonically increasing number within the session.
    pub sequence_number: u64,
    /// Wall-clock timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
    /// Engine-relative time, in milliseconds since the engine was created.
    pub engine_time_ms: u64,
}

/// Trait that all domain events implement.
pub trait DomainEvent: std::fmt::Debug {
    /// Returns the event type name (used for logging and routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
