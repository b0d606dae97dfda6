//! Cadence: narrative playback engine.
//!
//! Drives scripted, character-driven messages one at a time: a typewriter
//! reveal per message, optional interaction gates between messages,
//! forward/back/skip/reset navigation, session-scoped progress persistence,
//! and a watchdog that flags playback idling on the final message.

pub mod application;
pub mod domain;

pub use application::config::{PlaybackConfig, PlaybackTiming};
pub use application::engine::PlaybackEngine;
pub use application::observer::{PlaybackCallbacks, PlaybackObserver, SubscriptionId};
pub use application::view::PlaybackView;
pub use domain::aggregates::{PlaybackPhase, PlaybackState};
pub use domain::commands::PlaybackCommand;
pub use domain::events::{PlaybackEvent, PlaybackEventKind};
pub use domain::message::{Emotion, InteractionPoint, NarrativeMessage};
