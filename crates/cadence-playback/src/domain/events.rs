//! Domain events for narrative playback.
//!
//! Every state change of a `PlaybackState` is one of these events. Observers
//! receive them in the order they were applied.

use cadence_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};

/// Emitted when a message becomes current and its reveal restarts at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStarted {
    /// Queue index of the message.
    pub index: usize,
    /// The message identifier.
    pub message_id: String,
}

/// Emitted on every typewriter tick that leaves characters unrevealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRevealed {
    /// Queue index of the message being revealed.
    pub index: usize,
    /// Characters visible after this tick.
    pub revealed_length: usize,
}

/// Emitted when the current message is fully visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealCompleted {
    /// Queue index of the message.
    pub index: usize,
    /// Full length of the message in characters.
    pub revealed_length: usize,
    /// Whether the reveal was cut short by an advance command.
    pub instant: bool,
}

/// Emitted when an interaction point starts blocking playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionOpened {
    /// The interaction point identifier.
    pub interaction_id: String,
    /// Index of the message the point follows.
    pub after_message_index: usize,
    /// Opaque data for the host.
    pub payload: serde_json::Value,
}

/// Emitted when the host dismisses the active interaction point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionDismissed {
    /// The interaction point identifier.
    pub interaction_id: String,
    /// Index of the message the point follows.
    pub after_message_index: usize,
}

/// Emitted when the external pause flag flips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseChanged {
    /// The new value of the flag.
    pub paused: bool,
}

/// Emitted when playback idled on the final message past the watchdog limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StuckDetected {
    /// Queue index of the final message.
    pub index: usize,
    /// How long playback had been idle, in milliseconds.
    pub idle_ms: u64,
}

/// Emitted when an advance on the final message arms the completion
/// debounce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionScheduled {
    /// Queue index of the final message.
    pub index: usize,
    /// Engine time at which completion fires.
    pub due_ms: u64,
}

/// Emitted once per playback session when the narrative finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackCompleted {
    /// Index that was current when playback finished.
    pub from_index: usize,
    /// Whether the remaining messages were skipped.
    pub skipped: bool,
}

/// Emitted after a reset has cleared state back to the first message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackReset {
    /// Index that was current before the reset.
    pub from_index: usize,
}

/// Event payload variants for narrative playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEventKind {
    /// A message became current.
    MessageStarted(MessageStarted),
    /// One more character became visible.
    CharacterRevealed(CharacterRevealed),
    /// The current message is fully visible.
    RevealCompleted(RevealCompleted),
    /// An interaction point is blocking playback.
    InteractionOpened(InteractionOpened),
    /// The active interaction point was dismissed.
    InteractionDismissed(InteractionDismissed),
    /// The external pause flag changed.
    PauseChanged(PauseChanged),
    /// The watchdog flagged playback as stuck.
    StuckDetected(StuckDetected),
    /// Completion is pending behind the debounce window.
    CompletionScheduled(CompletionScheduled),
    /// Playback finished.
    Completed(PlaybackCompleted),
    /// Playback was reset to the first message.
    Reset(PlaybackReset),
}

/// Domain event envelope for narrative playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PlaybackEventKind,
}

impl DomainEvent for PlaybackEvent {
    fn event_type(&self) -> &'static str {
        match &self.kind {
            PlaybackEventKind::MessageStarted(_) => "playback.message_started",
            PlaybackEventKind::CharacterRevealed(_) => "playback.character_revealed",
            PlaybackEventKind::RevealCompleted(_) => "playback.reveal_completed",
            PlaybackEventKind::InteractionOpened(_) => "playback.interaction_opened",
            PlaybackEventKind::InteractionDismissed(_) => "playback.interaction_dismissed",
            PlaybackEventKind::PauseChanged(_) => "playback.pause_changed",
            PlaybackEventKind::StuckDetected(_) => "playback.stuck_detected",
            PlaybackEventKind::CompletionScheduled(_) => "playback.completion_scheduled",
            PlaybackEventKind::Completed(_) => "playback.completed",
            PlaybackEventKind::Reset(_) => "playback.reset",
        }
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or(serde_json::Value::Null)
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
