//! Timer slots owned by the engine.
//!
//! One slot per timer class, each holding at most one deadline in engine time
//! (milliseconds since construction). Arming a slot replaces whatever it held,
//! so a class can never have two outstanding timers. Firing reads nothing
//! captured at scheduling time; the engine consults its current state instead.

use std::fmt;

/// The timer classes the engine schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Next typewriter character.
    Typewriter,
    /// Auto-advance after a full reveal.
    AutoAdvance,
    /// Stuck detection on the final message.
    Watchdog,
    /// Debounced completion.
    Completion,
}

impl TimerKind {
    /// Every class, in tie-break order for timers due at the same instant.
    pub const ALL: [TimerKind; 4] = [
        TimerKind::Typewriter,
        TimerKind::Completion,
        TimerKind::AutoAdvance,
        TimerKind::Watchdog,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::Typewriter => 0,
            TimerKind::Completion => 1,
            TimerKind::AutoAdvance => 2,
            TimerKind::Watchdog => 3,
        }
    }
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimerKind::Typewriter => "typewriter",
            TimerKind::AutoAdvance => "auto_advance",
            TimerKind::Watchdog => "watchdog",
            TimerKind::Completion => "completion",
        };
        f.write_str(name)
    }
}

/// Deadlines for each timer class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimerSlots {
    deadlines: [Option<u64>; 4],
}

impl TimerSlots {
    /// Creates a set of empty slots.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `kind` at `due_ms`, cancelling any deadline it already had.
    /// Returns the replaced deadline.
    pub fn arm(&mut self, kind: TimerKind, due_ms: u64) -> Option<u64> {
        self.deadlines[kind.slot()].replace(due_ms)
    }

    /// Cancels `kind`. Returns whether a timer was outstanding.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].take().is_some()
    }

    /// Cancels every timer.
    pub fn cancel_all(&mut self) {
        self.deadlines = [None; 4];
    }

    /// Whether `kind` has an outstanding deadline.
    #[must_use]
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines[kind.slot()].is_some()
    }

    /// The deadline of `kind`, if armed.
    #[must_use]
    pub fn deadline(&self, kind: TimerKind) -> Option<u64> {
        self.deadlines[kind.slot()]
    }

    /// Earliest outstanding deadline across all classes.
    #[must_use]
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.iter().flatten().copied().min()
    }

    /// Number of outstanding timers.
    #[must_use]
    pub fn armed_count(&self) -> usize {
        self.deadlines.iter().flatten().count()
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerKind, u64)> {
        let (kind, due) = TimerKind::ALL
            .iter()
            .filter_map(|&kind| self.deadline(kind).map(|due| (kind, due)))
            .filter(|&(_, due)| due <= now_ms)
            .min_by_key(|&(kind, due)| (due, kind.slot()))?;
        self.cancel(kind);
        Some((kind, due))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arm_replaces_existing_deadline() {
        // Arrange
        let mut slots = TimerSlots::new();
        slots.arm(TimerKind::Typewriter, 30);

        // Act
        let replaced = slots.arm(TimerKind::Typewriter, 60);

        // Assert
        assert_eq!(replaced, Some(30));
        assert_eq!(slots.deadline(TimerKind::Typewriter), Some(60));
        assert_eq!(slots.armed_count(), 1);
    }

    #[test]
    fn test_pop_due_returns_earliest_first() {
        let mut slots = TimerSlots::new();
        slots.arm(TimerKind::Watchdog, 5_000);
        slots.arm(TimerKind::Typewriter, 30);
        slots.arm(TimerKind::AutoAdvance, 1_500);

        assert_eq!(slots.pop_due(10_000), Some((TimerKind::Typewriter, 30)));
        assert_eq!(slots.pop_due(10_000), Some((TimerKind::AutoAdvance, 1_500)));
        assert_eq!(slots.pop_due(10_000), Some((TimerKind::Watchdog, 5_000)));
        assert_eq!(slots.pop_due(10_000), None);
    }

    #[test]
    fn test_pop_due_ignores_future_deadlines() {
        let mut slots = TimerSlots::new();
        slots.arm(TimerKind::Completion, 100);

        assert_eq!(slots.pop_due(99), None);
        assert!(slots.is_armed(TimerKind::Completion));
        assert_eq!(slots.next_deadline(), Some(100));
    }

    #[test]
    fn test_ties_break_in_declared_order() {
        let mut slots = TimerSlots::new();
        slots.arm(TimerKind::Watchdog, 50);
        slots.arm(TimerKind::Completion, 50);

        assert_eq!(slots.pop_due(50), Some((TimerKind::Completion, 50)));
        assert_eq!(slots.pop_due(50), Some((TimerKind::Watchdog, 50)));
    }

    #[test]
    fn test_cancel_all_clears_every_slot() {
        let mut slots = TimerSlots::new();
        for (i, kind) in TimerKind::ALL.into_iter().enumerate() {
            slots.arm(kind, i as u64);
        }

        slots.cancel_all();

        assert_eq!(slots.armed_count(), 0);
        assert_eq!(slots.next_deadline(), None);
    }
}
