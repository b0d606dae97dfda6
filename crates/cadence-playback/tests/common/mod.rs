//! Shared helpers for playback integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use cadence_core::clock::Clock;
use cadence_core::store::SessionStore;
use cadence_playback::domain::events::PlaybackEventKind;
use cadence_playback::{
    NarrativeMessage, PlaybackConfig, PlaybackEngine, PlaybackEvent, PlaybackState,
};
use cadence_test_support::FixedClock;

/// Builds a queue with ids `m0`, `m1`, ... for the given contents.
pub fn queue(contents: &[&str]) -> Vec<NarrativeMessage> {
    contents
        .iter()
        .enumerate()
        .map(|(i, content)| NarrativeMessage::new(format!("m{i}"), *content))
        .collect()
}

/// Engine over `contents` with the fixed test clock.
pub fn engine(
    contents: &[&str],
    config: PlaybackConfig,
    store: Arc<dyn SessionStore>,
) -> PlaybackEngine {
    engine_with_clock(contents, config, store, Arc::new(FixedClock::default_instant()))
}

/// Engine over `contents` with a caller-supplied clock.
pub fn engine_with_clock(
    contents: &[&str],
    config: PlaybackConfig,
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
) -> PlaybackEngine {
    PlaybackEngine::new(queue(contents), config, store, clock)
}

/// Records a short label for every event the engine emits.
pub fn record_events(engine: &mut PlaybackEngine) -> Rc<RefCell<Vec<String>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    engine.subscribe(move |event: &PlaybackEvent, _: &PlaybackState| {
        sink.borrow_mut().push(label(&event.kind));
    });
    log
}

fn label(kind: &PlaybackEventKind) -> String {
    match kind {
        PlaybackEventKind::MessageStarted(e) => format!("started:{}", e.index),
        PlaybackEventKind::CharacterRevealed(e) => format!("revealed:{}", e.revealed_length),
        PlaybackEventKind::RevealCompleted(e) => format!("reveal_done:{}", e.index),
        PlaybackEventKind::InteractionOpened(e) => format!("opened:{}", e.interaction_id),
        PlaybackEventKind::InteractionDismissed(e) => format!("dismissed:{}", e.interaction_id),
        PlaybackEventKind::PauseChanged(e) => format!("paused:{}", e.paused),
        PlaybackEventKind::StuckDetected(e) => format!("stuck:{}", e.index),
        PlaybackEventKind::CompletionScheduled(e) => format!("completing:{}", e.index),
        PlaybackEventKind::Completed(e) => format!("completed:{}", e.skipped),
        PlaybackEventKind::Reset(e) => format!("reset:{}", e.from_index),
    }
}
