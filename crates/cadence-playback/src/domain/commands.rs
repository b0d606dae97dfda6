//! Commands for narrative playback.

use cadence_core::command::Command;

/// Navigation and control commands a host can send to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackCommand {
    /// Finish the current reveal, or move to the next message, or complete.
    Advance,
    /// Return to the previous message.
    Back,
    /// Finish playback immediately.
    SkipToEnd,
    /// Start over from the first message and forget saved progress.
    Reset,
    /// Acknowledge the active interaction point.
    DismissInteraction,
    /// Set the external pause flag.
    SetPaused(bool),
}

impl Command for PlaybackCommand {
    fn command_type(&self) -> &'static str {
        match self {
            Self::Advance => "playback.advance",
            Self::Back => "playback.back",
            Self::SkipToEnd => "playback.skip_to_end",
            Self::Reset => "playback.reset",
            Self::DismissInteraction => "playback.dismiss_interaction",
            Self::SetPaused(_) => "playback.set_paused",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_types() {
        assert_eq!(PlaybackCommand::Advance.command_type(), "playback.advance");
        assert_eq!(PlaybackCommand::SkipToEnd.command_type(), "playback.skip_to_end");
        assert_eq!(
            PlaybackCommand::SetPaused(true).command_type(),
            "playback.set_paused"
        );
    }
}
