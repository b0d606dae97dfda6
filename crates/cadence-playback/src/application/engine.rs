//! The playback engine: owns the state, the timers, persistence and observers.
//!
//! The engine never reads a real clock for its timers. It keeps its own
//! monotonic time (`now_ms`, zero at construction) and the host moves it
//! forward with `poll` or `advance_time`, waking up at `next_deadline`. Every
//! timer fires against the state as it is at that moment.

use std::sync::Arc;

use cadence_core::aggregate::AggregateRoot;
use cadence_core::clock::Clock;
use cadence_core::command::Command;
use cadence_core::event::{DomainEvent, EventMetadata};
use cadence_core::store::SessionStore;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use super::config::PlaybackConfig;
use super::observer::{Observers, PlaybackObserver, SubscriptionId};
use super::progress::{ProgressStore, RestoreOutcome};
use super::timers::{TimerKind, TimerSlots};
use super::view::{self, PlaybackView};
use super::watchdog::StuckWatchdog;
use crate::domain::aggregates::{PlaybackPhase, PlaybackState};
use crate::domain::commands::PlaybackCommand;
use crate::domain::events::{
    CharacterRevealed, CompletionScheduled, InteractionDismissed, InteractionOpened,
    MessageStarted, PauseChanged, PlaybackCompleted, PlaybackEvent, PlaybackEventKind,
    PlaybackReset, RevealCompleted, StuckDetected,
};
use crate::domain::gate::InteractionGate;
use crate::domain::message::NarrativeMessage;
use crate::domain::typewriter::{self, RevealStep};

/// Drives one playback session over an immutable message queue.
pub struct PlaybackEngine {
    session_id: Uuid,
    messages: Vec<NarrativeMessage>,
    gate: InteractionGate,
    config: PlaybackConfig,
    state: PlaybackState,
    timers: TimerSlots,
    watchdog: StuckWatchdog,
    progress: ProgressStore,
    observers: Observers,
    clock: Arc<dyn Clock>,
    now_ms: u64,
    sequence: u64,
    torn_down: bool,
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .field("timers", &self.timers)
            .field("now_ms", &self.now_ms)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl PlaybackEngine {
    /// Creates an engine and starts revealing the first message, or the
    /// message saved for `config.phase_key` if a fresh record exists.
    ///
    /// An empty `messages` list produces an inert engine.
    #[must_use]
    pub fn new(
        messages: Vec<NarrativeMessage>,
        config: PlaybackConfig,
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let message_count = messages.len();
        let gate = InteractionGate::new(config.interaction_points.clone(), message_count);
        let progress = ProgressStore::new(
            store,
            clock.clone(),
            &config.phase_key,
            config.timing.staleness_ms,
        );
        let mut engine = Self {
            session_id: Uuid::new_v4(),
            state: PlaybackState::new(message_count, config.paused_externally),
            watchdog: StuckWatchdog::new(config.timing.watchdog()),
            messages,
            gate,
            config,
            timers: TimerSlots::new(),
            progress,
            observers: Observers::default(),
            clock,
            now_ms: 0,
            sequence: 0,
            torn_down: false,
        };

        info!(
            session_id = %engine.session_id,
            phase_key = %engine.config.phase_key,
            message_count,
            interaction_points = engine.gate.len(),
            auto_advance = engine.config.auto_advance,
            "playback session created"
        );

        // Unusable records are discarded even when the queue is empty.
        let restored = engine.progress.restore(message_count);
        if message_count == 0 {
            debug!(session_id = %engine.session_id, ?restored, "empty message queue; nothing to play");
            return engine;
        }

        let start = match restored {
            RestoreOutcome::Restored(index) => {
                info!(session_id = %engine.session_id, index, "resuming saved progress");
                index
            }
            outcome => {
                debug!(session_id = %engine.session_id, ?outcome, "starting from the first message");
                0
            }
        };
        engine.enter_message(start);
        engine
    }

    /// Registers an observer for every subsequent event.
    pub fn subscribe(&mut self, observer: impl PlaybackObserver + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(observer))
    }

    /// Removes an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Identifier of this playback session.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// The live state.
    #[must_use]
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// The configuration the engine was built with.
    #[must_use]
    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// The message queue.
    #[must_use]
    pub fn messages(&self) -> &[NarrativeMessage] {
        &self.messages
    }

    /// The current message, or `None` for an empty queue.
    #[must_use]
    pub fn current_message(&self) -> Option<&NarrativeMessage> {
        self.messages.get(self.state.current_index())
    }

    /// The visible prefix of the current message.
    #[must_use]
    pub fn revealed_text(&self) -> &str {
        self.current_message().map_or("", |message| {
            typewriter::visible_prefix(&message.content, self.state.revealed_length())
        })
    }

    /// Snapshot for the presentation layer, or `None` for an empty queue.
    #[must_use]
    pub fn view(&self) -> Option<PlaybackView> {
        let message = self.current_message()?;
        Some(view::project(
            self.session_id,
            &self.config.character_name,
            &self.state,
            message,
            &self.gate,
            self.is_completion_pending(),
        ))
    }

    /// Engine time in milliseconds since construction.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Engine time at which the next timer is due, if any.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        if self.torn_down {
            return None;
        }
        self.timers.next_deadline()
    }

    /// Whether a debounced completion is waiting to fire.
    #[must_use]
    pub fn is_completion_pending(&self) -> bool {
        self.timers.is_armed(TimerKind::Completion)
    }

    /// Whether `teardown` has been called.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// The store key progress is saved under.
    #[must_use]
    pub fn progress_key(&self) -> &str {
        self.progress.key()
    }

    /// Moves engine time forward by `elapsed_ms`, firing due timers.
    pub fn advance_time(&mut self, elapsed_ms: u64) {
        self.poll(self.now_ms.saturating_add(elapsed_ms));
    }

    /// Moves engine time to `now_ms`, firing every timer due by then in
    /// deadline order. Times earlier than the current engine time are ignored.
    pub fn poll(&mut self, now_ms: u64) {
        if self.torn_down {
            return;
        }
        while let Some((kind, due_ms)) = self.timers.pop_due(now_ms) {
            self.now_ms = self.now_ms.max(due_ms);
            trace!(session_id = %self.session_id, timer = %kind, now_ms = self.now_ms, "timer fired");
            self.fire(kind);
        }
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Runs a command. Commands that make no sense in the current state are
    /// ignored.
    #[instrument(skip_all, fields(session_id = %self.session_id, command = command.command_type()))]
    pub fn execute(&mut self, command: PlaybackCommand) {
        match command {
            PlaybackCommand::Advance => self.advance(),
            PlaybackCommand::Back => self.back(),
            PlaybackCommand::SkipToEnd => self.skip_to_end(),
            PlaybackCommand::Reset => self.reset(),
            PlaybackCommand::DismissInteraction => self.dismiss_interaction(),
            PlaybackCommand::SetPaused(paused) => self.set_paused(paused),
        }
    }

    /// Mid-reveal: shows the whole message at once. Idle: moves to the next
    /// message, or schedules completion on the final one. Interaction:
    /// dismisses it.
    pub fn advance(&mut self) {
        if !self.is_live("advance") {
            return;
        }
        match self.state.phase() {
            PlaybackPhase::Typing => self.finish_reveal(true),
            PlaybackPhase::AwaitingAdvance => self.move_forward(),
            PlaybackPhase::Interaction => self.dismiss_interaction(),
            PlaybackPhase::Completed | PlaybackPhase::Empty => {
                debug!(session_id = %self.session_id, "advance ignored: playback completed");
            }
        }
    }

    /// Returns to the previous message and restarts its reveal.
    pub fn back(&mut self) {
        if !self.is_live("back") {
            return;
        }
        if self.state.is_completed() {
            debug!(session_id = %self.session_id, "back ignored: playback completed");
            return;
        }
        let index = self.state.current_index();
        if index == 0 {
            debug!(session_id = %self.session_id, "back ignored: already at the first message");
            return;
        }
        self.timers.cancel(TimerKind::Completion);
        self.enter_message(index - 1);
    }

    /// Finishes playback immediately, skipping remaining messages and
    /// interaction points.
    pub fn skip_to_end(&mut self) {
        if !self.is_live("skip_to_end") {
            return;
        }
        if self.state.is_completed() {
            debug!(session_id = %self.session_id, "skip ignored: playback completed");
            return;
        }
        self.complete(true);
    }

    /// Acknowledges the active interaction point and carries on as an advance
    /// would.
    pub fn dismiss_interaction(&mut self) {
        if !self.is_live("dismiss_interaction") {
            return;
        }
        let Some(interaction_id) = self.state.active_interaction().map(str::to_owned) else {
            debug!(session_id = %self.session_id, "dismiss ignored: no active interaction");
            return;
        };
        let after_message_index = self.state.current_index();
        info!(session_id = %self.session_id, %interaction_id, "interaction dismissed");
        self.emit(PlaybackEventKind::InteractionDismissed(InteractionDismissed {
            interaction_id,
            after_message_index,
        }));
        self.move_forward();
    }

    /// Starts over at the first message, forgetting saved progress. Works
    /// from any state, including after completion.
    pub fn reset(&mut self) {
        if !self.is_live("reset") {
            return;
        }
        let from_index = self.state.current_index();
        self.timers.cancel_all();
        if let Err(e) = self.progress.clear() {
            warn!(session_id = %self.session_id, key = %self.progress.key(), error = %e, "could not clear saved progress");
        }
        self.emit(PlaybackEventKind::Reset(PlaybackReset { from_index }));
        info!(session_id = %self.session_id, from_index, "playback reset");
        self.begin_reveal();
    }

    /// Sets the external pause flag. While paused the typewriter is frozen and
    /// neither auto-advance nor the watchdog can fire.
    pub fn set_paused(&mut self, paused: bool) {
        if !self.is_live("set_paused") || self.state.paused_externally() == paused {
            return;
        }
        self.emit(PlaybackEventKind::PauseChanged(PauseChanged { paused }));
        if paused {
            self.timers.cancel(TimerKind::Typewriter);
            self.timers.cancel(TimerKind::AutoAdvance);
            self.timers.cancel(TimerKind::Watchdog);
            return;
        }
        match self.state.phase() {
            PlaybackPhase::Typing => self.arm_tick(),
            PlaybackPhase::AwaitingAdvance => self.schedule_idle_timers(),
            _ => {}
        }
    }

    /// Cancels every timer. Later commands and polls do nothing.
    pub fn teardown(&mut self) {
        self.timers.cancel_all();
        self.torn_down = true;
        debug!(session_id = %self.session_id, "playback engine torn down");
    }

    fn is_live(&self, command: &'static str) -> bool {
        if self.torn_down {
            debug!(session_id = %self.session_id, command, "command ignored: engine torn down");
            return false;
        }
        if self.state.phase() == PlaybackPhase::Empty {
            debug!(session_id = %self.session_id, command, "command ignored: empty message queue");
            return false;
        }
        true
    }

    fn current_len(&self) -> usize {
        self.current_message().map_or(0, NarrativeMessage::char_len)
    }

    fn move_forward(&mut self) {
        if self.state.is_final_message() {
            self.schedule_completion();
        } else {
            self.enter_message(self.state.current_index() + 1);
        }
    }

    fn enter_message(&mut self, index: usize) {
        self.timers.cancel(TimerKind::Typewriter);
        self.timers.cancel(TimerKind::AutoAdvance);
        self.timers.cancel(TimerKind::Watchdog);
        let message_id = self.messages[index].id.clone();
        debug!(session_id = %self.session_id, index, %message_id, "message started");
        self.emit(PlaybackEventKind::MessageStarted(MessageStarted { index, message_id }));
        if let Err(e) = self.progress.save(index) {
            warn!(session_id = %self.session_id, key = %self.progress.key(), error = %e, "could not save progress");
        }
        self.begin_reveal();
    }

    fn begin_reveal(&mut self) {
        if self.current_len() == 0 {
            self.finish_reveal(false);
        } else if !self.state.paused_externally() {
            self.arm_tick();
        }
    }

    fn arm_tick(&mut self) {
        let due = self.now_ms.saturating_add(self.config.timing.tick());
        self.timers.arm(TimerKind::Typewriter, due);
    }

    fn finish_reveal(&mut self, instant: bool) {
        self.timers.cancel(TimerKind::Typewriter);
        let index = self.state.current_index();
        self.emit(PlaybackEventKind::RevealCompleted(RevealCompleted {
            index,
            revealed_length: self.current_len(),
            instant,
        }));

        if let Some(point) = self.gate.at(index) {
            let interaction_id = point.id.clone();
            let payload = point.payload.clone();
            info!(session_id = %self.session_id, %interaction_id, index, "interaction point reached");
            self.emit(PlaybackEventKind::InteractionOpened(InteractionOpened {
                interaction_id,
                after_message_index: index,
                payload,
            }));
            return;
        }
        self.schedule_idle_timers();
    }

    fn schedule_idle_timers(&mut self) {
        if self.state.phase() != PlaybackPhase::AwaitingAdvance || self.state.paused_externally() {
            return;
        }
        if self.state.is_final_message() {
            self.watchdog.sync(&self.state, &mut self.timers, self.now_ms);
        } else if self.config.auto_advance {
            let delay = self
                .config
                .timing
                .reveal_delay(self.current_message().and_then(|m| m.reveal_delay_ms));
            self.timers
                .arm(TimerKind::AutoAdvance, self.now_ms.saturating_add(delay));
        }
    }

    fn schedule_completion(&mut self) {
        if self.timers.is_armed(TimerKind::Completion) {
            debug!(session_id = %self.session_id, "completion already pending; duplicate trigger absorbed");
            return;
        }
        self.timers.cancel(TimerKind::AutoAdvance);
        self.timers.cancel(TimerKind::Watchdog);
        let due = self
            .now_ms
            .saturating_add(self.config.timing.completion_debounce());
        self.timers.arm(TimerKind::Completion, due);
        debug!(session_id = %self.session_id, due_ms = due, "completion scheduled");
        self.emit(PlaybackEventKind::CompletionScheduled(CompletionScheduled {
            index: self.state.current_index(),
            due_ms: due,
        }));
    }

    fn complete(&mut self, skipped: bool) {
        let from_index = self.state.current_index();
        self.timers.cancel_all();
        self.emit(PlaybackEventKind::Completed(PlaybackCompleted {
            from_index,
            skipped,
        }));
        info!(session_id = %self.session_id, from_index, skipped, "playback completed");
        if self.config.clear_progress_on_complete {
            if let Err(e) = self.progress.clear() {
                warn!(session_id = %self.session_id, key = %self.progress.key(), error = %e, "could not clear saved progress");
            }
        }
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            TimerKind::Typewriter => self.on_typewriter_tick(),
            TimerKind::AutoAdvance => self.on_auto_advance(),
            TimerKind::Watchdog => self.on_watchdog(),
            TimerKind::Completion => {
                if !self.state.is_completed() {
                    self.complete(false);
                }
            }
        }
    }

    fn on_typewriter_tick(&mut self) {
        if !self.state.typing_active() || self.state.paused_externally() {
            return;
        }
        let index = self.state.current_index();
        match typewriter::step(self.state.revealed_length(), self.current_len()) {
            RevealStep::Partial(revealed_length) => {
                self.emit(PlaybackEventKind::CharacterRevealed(CharacterRevealed {
                    index,
                    revealed_length,
                }));
                self.arm_tick();
            }
            RevealStep::Complete(_) => self.finish_reveal(false),
        }
    }

    fn on_auto_advance(&mut self) {
        if !self.config.auto_advance
            || self.state.paused_externally()
            || self.state.phase() != PlaybackPhase::AwaitingAdvance
            || self.state.is_final_message()
        {
            return;
        }
        debug!(session_id = %self.session_id, index = self.state.current_index(), "auto-advancing");
        self.enter_message(self.state.current_index() + 1);
    }

    fn on_watchdog(&mut self) {
        if !StuckWatchdog::should_watch(&self.state, &self.timers) {
            return;
        }
        let index = self.state.current_index();
        warn!(session_id = %self.session_id, index, "playback idle on the final message; flagging as stuck");
        self.emit(PlaybackEventKind::StuckDetected(StuckDetected {
            index,
            idle_ms: self.watchdog.threshold_ms(),
        }));
    }

    fn emit(&mut self, kind: PlaybackEventKind) {
        self.sequence += 1;
        let event = PlaybackEvent {
            metadata: EventMetadata {
                session_id: self.session_id,
                sequence_number: self.sequence,
                occurred_at: self.clock.now(),
                engine_time_ms: self.now_ms,
            },
            kind,
        };
        self.state.apply(&event);
        trace!(
            session_id = %self.session_id,
            event_type = event.event_type(),
            version = self.state.version(),
            "event applied"
        );
        self.observers.notify(&event, &self.state);
    }
}
