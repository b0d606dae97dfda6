//! Engine configuration.

use crate::domain::message::InteractionPoint;

/// Delay between typewriter ticks.
pub const DEFAULT_TICK_MS: u64 = 30;
/// Pause after a full reveal before auto-advance, unless a message overrides it.
pub const DEFAULT_REVEAL_DELAY_MS: u64 = 1_500;
/// Idle time on the final message before playback is flagged as stuck.
pub const DEFAULT_WATCHDOG_MS: u64 = 5_000;
/// Window that absorbs duplicate completion triggers.
pub const DEFAULT_COMPLETION_DEBOUNCE_MS: u64 = 100;
/// Maximum age of a saved position that will still be restored.
pub const DEFAULT_STALENESS_MS: u64 = 5 * 60 * 1_000;

/// Timing knobs. All durations are milliseconds; zero is treated as one so
/// a timer can never fire in a tight loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackTiming {
    /// Typewriter tick interval.
    pub tick_ms: u64,
    /// Default post-reveal delay for auto-advance.
    pub default_reveal_delay_ms: u64,
    /// Stuck watchdog threshold.
    pub watchdog_ms: u64,
    /// Completion debounce window.
    pub completion_debounce_ms: u64,
    /// Saved-progress staleness window.
    pub staleness_ms: u64,
}

impl Default for PlaybackTiming {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            default_reveal_delay_ms: DEFAULT_REVEAL_DELAY_MS,
            watchdog_ms: DEFAULT_WATCHDOG_MS,
            completion_debounce_ms: DEFAULT_COMPLETION_DEBOUNCE_MS,
            staleness_ms: DEFAULT_STALENESS_MS,
        }
    }
}

impl PlaybackTiming {
    pub(crate) fn tick(&self) -> u64 {
        self.tick_ms.max(1)
    }

    pub(crate) fn reveal_delay(&self, message_override: Option<u64>) -> u64 {
        message_override
            .unwrap_or(self.default_reveal_delay_ms)
            .max(1)
    }

    pub(crate) fn watchdog(&self) -> u64 {
        self.watchdog_ms.max(1)
    }

    pub(crate) fn completion_debounce(&self) -> u64 {
        self.completion_debounce_ms.max(1)
    }
}

/// Construction parameters for a `PlaybackEngine`.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Scripted pauses between messages.
    pub interaction_points: Vec<InteractionPoint>,
    /// Move on automatically after each reveal (never past the final message).
    pub auto_advance: bool,
    /// Namespace for saved progress.
    pub phase_key: String,
    /// Display name handed to the view unchanged.
    pub character_name: String,
    /// Start paused.
    pub paused_externally: bool,
    /// Forget saved progress once playback completes.
    pub clear_progress_on_complete: bool,
    /// Timer durations.
    pub timing: PlaybackTiming,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interaction_points: Vec::new(),
            auto_advance: false,
            phase_key: "default".to_owned(),
            character_name: "Maya".to_owned(),
            paused_externally: false,
            clear_progress_on_complete: true,
            timing: PlaybackTiming::default(),
        }
    }
}

impl PlaybackConfig {
    /// Sets the interaction points.
    #[must_use]
    pub fn with_interaction_points(mut self, points: Vec<InteractionPoint>) -> Self {
        self.interaction_points = points;
        self
    }

    /// Enables or disables auto-advance.
    #[must_use]
    pub fn with_auto_advance(mut self, auto_advance: bool) -> Self {
        self.auto_advance = auto_advance;
        self
    }

    /// Sets the persistence namespace.
    #[must_use]
    pub fn with_phase_key(mut self, phase_key: impl Into<String>) -> Self {
        self.phase_key = phase_key.into();
        self
    }

    /// Sets the character name passed to the view.
    #[must_use]
    pub fn with_character_name(mut self, name: impl Into<String>) -> Self {
        self.character_name = name.into();
        self
    }

    /// Sets the initial external pause flag.
    #[must_use]
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused_externally = paused;
        self
    }

    /// Chooses whether completion clears saved progress.
    #[must_use]
    pub fn with_clear_progress_on_complete(mut self, clear: bool) -> Self {
        self.clear_progress_on_complete = clear;
        self
    }

    /// Replaces the timer durations.
    #[must_use]
    pub fn with_timing(mut self, timing: PlaybackTiming) -> Self {
        self.timing = timing;
        self
    }
}
