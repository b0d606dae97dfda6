//! Aggregate root for a playback session.

use cadence_core::aggregate::AggregateRoot;
use serde::Serialize;

use super::events::{PlaybackEvent, PlaybackEventKind};

/// Where the state machine currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    /// The message queue is empty; nothing ever happens.
    Empty,
    /// The current message is being revealed.
    Typing,
    /// The current message is fully revealed and playback is idle.
    AwaitingAdvance,
    /// An interaction point is blocking progress.
    Interaction,
    /// Playback has finished. Only a reset leaves this phase.
    Completed,
}

/// Live state of one playback session.
///
/// Mutated only through `apply`, which makes it the pure transition function
/// of the state machine. Timers, persistence and observers live in the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub(crate) message_count: usize,
    pub(crate) current_index: usize,
    pub(crate) revealed_length: usize,
    pub(crate) phase: PlaybackPhase,
    pub(crate) paused_externally: bool,
    pub(crate) stuck: bool,
    pub(crate) active_interaction: Option<String>,
    pub(crate) version: u64,
}

impl PlaybackState {
    /// Creates the state for a queue of `message_count` messages, positioned
    /// on the first message (or `Empty` for an empty queue).
    #[must_use]
    pub fn new(message_count: usize, paused_externally: bool) -> Self {
        Self {
            message_count,
            current_index: 0,
            revealed_length: 0,
            phase: Self::initial_phase(message_count),
            paused_externally,
            stuck: false,
            active_interaction: None,
            version: 0,
        }
    }

    fn initial_phase(message_count: usize) -> PlaybackPhase {
        if message_count == 0 {
            PlaybackPhase::Empty
        } else {
            PlaybackPhase::Typing
        }
    }

    /// Number of messages in the queue.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.message_count
    }

    /// Index of the current message.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Characters of the current message that are visible.
    #[must_use]
    pub fn revealed_length(&self) -> usize {
        self.revealed_length
    }

    /// The current phase.
    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    /// Whether the typewriter is revealing the current message.
    #[must_use]
    pub fn typing_active(&self) -> bool {
        self.phase == PlaybackPhase::Typing
    }

    /// Whether an interaction point is blocking progress.
    #[must_use]
    pub fn interaction_active(&self) -> bool {
        self.phase == PlaybackPhase::Interaction
    }

    /// Whether the host has paused playback.
    #[must_use]
    pub fn paused_externally(&self) -> bool {
        self.paused_externally
    }

    /// Whether the watchdog has flagged playback as stuck.
    #[must_use]
    pub fn stuck(&self) -> bool {
        self.stuck
    }

    /// Identifier of the interaction point currently blocking, if any.
    #[must_use]
    pub fn active_interaction(&self) -> Option<&str> {
        self.active_interaction.as_deref()
    }

    /// Whether playback has finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.phase == PlaybackPhase::Completed
    }

    /// Whether the current message is the last one in the queue.
    #[must_use]
    pub fn is_final_message(&self) -> bool {
        self.message_count > 0 && self.current_index == self.message_count - 1
    }

    /// Fully revealed, idle, and on the final message.
    #[must_use]
    pub fn is_idle_on_final_message(&self) -> bool {
        self.phase == PlaybackPhase::AwaitingAdvance && self.is_final_message()
    }
}

impl AggregateRoot for PlaybackState {
    type Event = PlaybackEvent;

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            PlaybackEventKind::MessageStarted(payload) => {
                self.current_index = payload.index;
                self.revealed_length = 0;
                self.phase = PlaybackPhase::Typing;
                self.stuck = false;
                self.active_interaction = None;
            }
            PlaybackEventKind::CharacterRevealed(payload) => {
                self.revealed_length = payload.revealed_length;
            }
            PlaybackEventKind::RevealCompleted(payload) => {
                self.revealed_length = payload.revealed_length;
                self.phase = PlaybackPhase::AwaitingAdvance;
            }
            PlaybackEventKind::InteractionOpened(payload) => {
                self.phase = PlaybackPhase::Interaction;
                self.active_interaction = Some(payload.interaction_id.clone());
            }
            PlaybackEventKind::InteractionDismissed(_) => {
                self.phase = PlaybackPhase::AwaitingAdvance;
                self.active_interaction = None;
            }
            PlaybackEventKind::PauseChanged(payload) => {
                self.paused_externally = payload.paused;
            }
            PlaybackEventKind::StuckDetected(_) => {
                self.stuck = true;
            }
            PlaybackEventKind::CompletionScheduled(_) => {
                self.stuck = false;
            }
            PlaybackEventKind::Completed(_) => {
                self.phase = PlaybackPhase::Completed;
                self.stuck = false;
                self.active_interaction = None;
            }
            PlaybackEventKind::Reset(_) => {
                self.current_index = 0;
                self.revealed_length = 0;
                self.phase = Self::initial_phase(self.message_count);
                self.stuck = false;
                self.active_interaction = None;
            }
        }
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::{
        InteractionDismissed, InteractionOpened, MessageStarted, PlaybackCompleted,
        CompletionScheduled, PlaybackReset, RevealCompleted, StuckDetected,
    };
    use cadence_core::clock::Clock;
    use cadence_core::event::EventMetadata;
    use cadence_test_support::FixedClock;
    use uuid::Uuid;

    fn event(kind: PlaybackEventKind) -> PlaybackEvent {
        PlaybackEvent {
            metadata: EventMetadata {
                session_id: Uuid::nil(),
                sequence_number: 1,
                occurred_at: FixedClock::default_instant().now(),
                engine_time_ms: 0,
            },
            kind,
        }
    }

    #[test]
    fn test_new_state_on_empty_queue_is_empty_phase() {
        let state = PlaybackState::new(0, false);

        assert_eq!(state.phase(), PlaybackPhase::Empty);
        assert!(!state.is_final_message());
    }

    #[test]
    fn test_message_started_resets_reveal_and_stuck() {
        // Arrange
        let mut state = PlaybackState::new(3, false);
        state.revealed_length = 5;
        state.stuck = true;
        state.phase = PlaybackPhase::AwaitingAdvance;

        // Act
        state.apply(&event(PlaybackEventKind::MessageStarted(MessageStarted {
            index: 2,
            message_id: "m3".to_owned(),
        })));

        // Assert
        assert_eq!(state.current_index(), 2);
        assert_eq!(state.revealed_length(), 0);
        assert!(state.typing_active());
        assert!(!state.stuck());
        assert_eq!(state.version(), 1);
    }

    #[test]
    fn test_reveal_completed_moves_to_awaiting_advance() {
        let mut state = PlaybackState::new(2, false);

        state.apply(&event(PlaybackEventKind::RevealCompleted(RevealCompleted {
            index: 0,
            revealed_length: 2,
            instant: false,
        })));

        assert_eq!(state.phase(), PlaybackPhase::AwaitingAdvance);
        assert_eq!(state.revealed_length(), 2);
        assert!(!state.typing_active());
    }

    #[test]
    fn test_interaction_open_and_dismiss_are_mutually_exclusive_with_typing() {
        let mut state = PlaybackState::new(2, false);

        state.apply(&event(PlaybackEventKind::InteractionOpened(InteractionOpened {
            interaction_id: "quiz".to_owned(),
            after_message_index: 0,
            payload: serde_json::Value::Null,
        })));
        assert!(state.interaction_active());
        assert!(!state.typing_active());
        assert_eq!(state.active_interaction(), Some("quiz"));

        state.apply(&event(PlaybackEventKind::InteractionDismissed(
            InteractionDismissed {
                interaction_id: "quiz".to_owned(),
                after_message_index: 0,
            },
        )));
        assert_eq!(state.phase(), PlaybackPhase::AwaitingAdvance);
        assert!(state.active_interaction().is_none());
    }

    #[test]
    fn test_stuck_then_completed_clears_stuck() {
        let mut state = PlaybackState::new(1, false);
        state.phase = PlaybackPhase::AwaitingAdvance;

        state.apply(&event(PlaybackEventKind::StuckDetected(StuckDetected {
            index: 0,
            idle_ms: 5000,
        })));
        assert!(state.stuck());
        assert!(state.is_idle_on_final_message());

        state.apply(&event(PlaybackEventKind::Completed(PlaybackCompleted {
            from_index: 0,
            skipped: false,
        })));
        assert!(state.is_completed());
        assert!(!state.stuck());
    }

    #[test]
    fn test_completion_scheduled_clears_stuck() {
        let mut state = PlaybackState::new(2, false);
        state.current_index = 1;
        state.phase = PlaybackPhase::AwaitingAdvance;
        state.stuck = true;

        state.apply(&event(PlaybackEventKind::CompletionScheduled(
            CompletionScheduled {
                index: 1,
                due_ms: 5_160,
            },
        )));

        assert!(!state.stuck());
        assert_eq!(state.phase(), PlaybackPhase::AwaitingAdvance);
    }

    #[test]
    fn test_reset_returns_to_first_message() {
        let mut state = PlaybackState::new(3, true);
        state.current_index = 2;
        state.revealed_length = 4;
        state.phase = PlaybackPhase::Completed;

        state.apply(&event(PlaybackEventKind::Reset(PlaybackReset { from_index: 2 })));

        assert_eq!(state.current_index(), 0);
        assert_eq!(state.revealed_length(), 0);
        assert_eq!(state.phase(), PlaybackPhase::Typing);
        assert!(state.paused_externally());
    }
}
