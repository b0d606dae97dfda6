//! Cadence terminal player: loads a narrative script and plays it on stdout,
//! taking navigation commands from stdin.

pub mod config;
pub mod driver;
pub mod error;
pub mod script;
