//! Domain model: messages, state, events, commands, and the pure pieces of
//! playback logic.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod gate;
pub mod message;
pub mod typewriter;
