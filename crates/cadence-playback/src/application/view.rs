//! Read-only view of a playback session for the presentation layer.

use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{PlaybackPhase, PlaybackState};
use crate::domain::gate::InteractionGate;
use crate::domain::message::{Emotion, NarrativeMessage};
use crate::domain::typewriter;

/// The interaction point currently blocking playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionView {
    /// The interaction point identifier.
    pub id: String,
    /// Opaque data supplied with the point.
    pub payload: serde_json::Value,
}

/// Everything a view needs to render the current moment of playback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackView {
    /// The playback session identifier.
    pub session_id: Uuid,
    /// Current state machine phase.
    pub phase: PlaybackPhase,
    /// Character name from the configuration, untouched.
    pub character_name: String,
    /// Index of the current message.
    pub current_index: usize,
    /// Number of messages in the queue.
    pub message_count: usize,
    /// Identifier of the current message.
    pub message_id: String,
    /// Mood tag of the current message.
    pub emotion: Emotion,
    /// Whether to show the avatar for the current message.
    pub show_avatar: bool,
    /// The visible prefix of the current message.
    pub revealed_text: String,
    /// Characters visible.
    pub revealed_length: usize,
    /// Characters in the full message.
    pub total_length: usize,
    /// Whether the typewriter is running for this message.
    pub typing_active: bool,
    /// Whether an interaction point is blocking.
    pub interaction_active: bool,
    /// Whether the host paused playback.
    pub paused: bool,
    /// Whether the watchdog flagged playback as stuck; hosts offer a reset.
    pub stuck: bool,
    /// The blocking interaction point, if any.
    pub interaction: Option<InteractionView>,
    /// Whether a back command would do anything.
    pub can_go_back: bool,
    /// Whether an advance command would do anything.
    pub can_advance: bool,
    /// Position through the queue, 1-100.
    pub progress_percent: u8,
}

pub(crate) fn project(
    session_id: Uuid,
    character_name: &str,
    state: &PlaybackState,
    message: &NarrativeMessage,
    gate: &InteractionGate,
    completion_pending: bool,
) -> PlaybackView {
    let interaction = state
        .active_interaction()
        .and_then(|id| gate.by_id(id))
        .map(|point| InteractionView {
            id: point.id.clone(),
            payload: point.payload.clone(),
        });
    let completed = state.phase() == PlaybackPhase::Completed;
    let progress = (state.current_index() + 1) * 100 / state.message_count().max(1);

    PlaybackView {
        session_id,
        phase: state.phase(),
        character_name: character_name.to_owned(),
        current_index: state.current_index(),
        message_count: state.message_count(),
        message_id: message.id.clone(),
        emotion: message.emotion,
        show_avatar: message.show_avatar,
        revealed_text: typewriter::visible_prefix(&message.content, state.revealed_length())
            .to_owned(),
        revealed_length: state.revealed_length(),
        total_length: message.char_len(),
        typing_active: state.typing_active(),
        interaction_active: state.interaction_active(),
        paused: state.paused_externally(),
        stuck: state.stuck(),
        interaction,
        can_go_back: !completed && state.current_index() > 0,
        can_advance: !completed && !completion_pending,
        progress_percent: u8::try_from(progress.min(100)).unwrap_or(100),
    }
}
