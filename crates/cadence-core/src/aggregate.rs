//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for state objects whose every mutation is expressed as an event.
///
/// `apply` is the only place state changes; it must be deterministic so that
/// replaying the same events yields the same state.
pub trait AggregateRoot {
    /// The event type this aggregate consumes.
    type Event: DomainEvent;

    /// Returns the current version (number of events applied).
    fn version(&self) -> u64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);
}
