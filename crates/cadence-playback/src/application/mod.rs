//! Application layer: the engine that owns state, timers, persistence, and
//! observers.

pub mod config;
pub mod engine;
pub mod observer;
pub mod progress;
pub mod timers;
pub mod view;
pub mod watchdog;
