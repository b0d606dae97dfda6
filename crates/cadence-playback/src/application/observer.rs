//! Observers notified after every applied playback event.

use std::fmt;

use crate::domain::aggregates::PlaybackState;
use crate::domain::events::{PlaybackEvent, PlaybackEventKind};

/// Receives every event after it has been applied to the state.
pub trait PlaybackObserver {
    /// Called with the event and the state it produced.
    fn on_event(&mut self, event: &PlaybackEvent, state: &PlaybackState);
}

impl<F> PlaybackObserver for F
where
    F: FnMut(&PlaybackEvent, &PlaybackState),
{
    fn on_event(&mut self, event: &PlaybackEvent, state: &PlaybackState) {
        self(event, state);
    }
}

/// Handle returned by `PlaybackEngine::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Lifecycle callbacks for hosts that only care about the three outcomes
/// the surrounding application wires to business logic.
#[derive(Default)]
pub struct PlaybackCallbacks {
    on_complete: Option<Box<dyn FnMut()>>,
    on_interaction_reached: Option<Box<dyn FnMut(&str)>>,
    on_reset: Option<Box<dyn FnMut()>>,
}

impl PlaybackCallbacks {
    /// Creates an empty set of callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once per playback session when it finishes.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Called with the interaction id each time an interaction is dismissed.
    #[must_use]
    pub fn on_interaction_reached(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_interaction_reached = Some(Box::new(callback));
        self
    }

    /// Called once per reset, after state has been cleared.
    #[must_use]
    pub fn on_reset(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_reset = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for PlaybackCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackCallbacks")
            .field("on_complete", &self.on_complete.is_some())
            .field("on_interaction_reached", &self.on_interaction_reached.is_some())
            .field("on_reset", &self.on_reset.is_some())
            .finish()
    }
}

impl PlaybackObserver for PlaybackCallbacks {
    fn on_event(&mut self, event: &PlaybackEvent, _state: &PlaybackState) {
        match &event.kind {
            PlaybackEventKind::Completed(_) => {
                if let Some(callback) = self.on_complete.as_mut() {
                    callback();
                }
            }
            PlaybackEventKind::InteractionDismissed(payload) => {
                if let Some(callback) = self.on_interaction_reached.as_mut() {
                    callback(&payload.interaction_id);
                }
            }
            PlaybackEventKind::Reset(_) => {
                if let Some(callback) = self.on_reset.as_mut() {
                    callback();
                }
            }
            _ => {}
        }
    }
}

/// Registered observers, notified in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Box<dyn PlaybackObserver>)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Box<dyn PlaybackObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, event: &PlaybackEvent, state: &PlaybackState) {
        for (_, observer) in &mut self.entries {
            observer.on_event(event, state);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
