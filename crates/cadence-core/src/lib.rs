//! Cadence Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the playback
//! engine and its hosts depend on. Apart from the in-memory session store it
//! contains no infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod store;
