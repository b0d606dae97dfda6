//! Stuck watchdog: flags playback that idles on the final message.

use crate::domain::aggregates::PlaybackState;

use super::timers::{TimerKind, TimerSlots};

/// Decides when the watchdog timer runs and schedules it.
#[derive(Debug, Clone, Copy)]
pub struct StuckWatchdog {
    threshold_ms: u64,
}

impl StuckWatchdog {
    /// Creates a watchdog that fires after `threshold_ms` of idling.
    #[must_use]
    pub fn new(threshold_ms: u64) -> Self {
        Self {
            threshold_ms: threshold_ms.max(1),
        }
    }

    /// Idle threshold in milliseconds.
    #[must_use]
    pub fn threshold_ms(&self) -> u64 {
        self.threshold_ms
    }

    /// The watchdog only runs while idle on the final message, unpaused, not
    /// already flagged, and with no completion on its way.
    #[must_use]
    pub fn should_watch(state: &PlaybackState, timers: &TimerSlots) -> bool {
        state.is_idle_on_final_message()
            && !state.paused_externally()
            && !state.stuck()
            && !timers.is_armed(TimerKind::Completion)
    }

    /// Arms the watchdog if the state calls for it, otherwise makes sure it is
    /// not running. Returns whether it is armed afterwards.
    pub fn sync(&self, state: &PlaybackState, timers: &mut TimerSlots, now_ms: u64) -> bool {
        if Self::should_watch(state, timers) {
            if !timers.is_armed(TimerKind::Watchdog) {
                timers.arm(TimerKind::Watchdog, now_ms.saturating_add(self.threshold_ms));
            }
            true
        } else {
            timers.cancel(TimerKind::Watchdog);
            false
        }
    }
}
