//! Terminal driver: runs the engine against tokio time, renders it as text and
//! feeds it commands read line by line.

use std::io::{self, Write};
use std::time::Duration;

use cadence_core::store::SessionStore;
use cadence_playback::application::progress;
use cadence_playback::{
    PlaybackCommand, PlaybackEngine, PlaybackPhase, PlaybackState, PlaybackView,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// A line of input from the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    /// Empty line, `n` or `next`.
    Advance,
    /// `b` or `back`.
    Back,
    /// `s` or `skip`.
    Skip,
    /// `r` or `reset`.
    Reset,
    /// `R` or `reset-all`: forgets saved progress for every phase, then
    /// resets.
    ResetAll,
    /// `p` or `pause`: flips the pause flag.
    TogglePause,
    /// `d` or `dismiss`.
    Dismiss,
    /// `q` or `quit`.
    Quit,
}

impl PlayerCommand {
    /// Parses one input line. Unknown input yields `None`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line == "R" {
            return Some(Self::ResetAll);
        }
        match line.to_ascii_lowercase().as_str() {
            "" | "n" | "next" => Some(Self::Advance),
            "b" | "back" => Some(Self::Back),
            "s" | "skip" => Some(Self::Skip),
            "r" | "reset" => Some(Self::Reset),
            "reset-all" => Some(Self::ResetAll),
            "p" | "pause" => Some(Self::TogglePause),
            "d" | "dismiss" => Some(Self::Dismiss),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// The engine command this maps to, given the current state. `Quit` has
    /// none.
    #[must_use]
    pub fn to_playback(self, state: &PlaybackState) -> Option<PlaybackCommand> {
        match self {
            Self::Advance => Some(PlaybackCommand::Advance),
            Self::Back => Some(PlaybackCommand::Back),
            Self::Skip => Some(PlaybackCommand::SkipToEnd),
            Self::Reset | Self::ResetAll => Some(PlaybackCommand::Reset),
            Self::TogglePause => Some(PlaybackCommand::SetPaused(!state.paused_externally())),
            Self::Dismiss => Some(PlaybackCommand::DismissInteraction),
            Self::Quit => None,
        }
    }
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Playback completed.
    Completed,
    /// Input ended and no timer was left to fire.
    Idle,
    /// The reader asked to quit.
    Quit,
}

#[derive(Debug, Default)]
struct Shown {
    index: usize,
    revealed: usize,
    interaction: bool,
    stuck: bool,
    completed: bool,
}

/// Writes only what changed since the previous view.
#[derive(Debug, Default)]
pub struct Renderer {
    shown: Option<Shown>,
}

impl Renderer {
    /// Creates a renderer that has shown nothing yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `view` incrementally to `out`.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to `out`.
    pub fn render<W: Write>(&mut self, view: &PlaybackView, out: &mut W) -> io::Result<()> {
        let completed = view.phase == PlaybackPhase::Completed;
        let mut shown = match self.shown.take() {
            Some(shown)
                if shown.index == view.current_index
                    && view.revealed_length >= shown.revealed
                    && (completed || !shown.completed) =>
            {
                shown
            }
            previous => {
                if previous.is_some() {
                    writeln!(out)?;
                }
                if view.show_avatar {
                    write!(out, "{} ({}): ", view.character_name, view.emotion.as_str())?;
                } else {
                    write!(out, "  ")?;
                }
                Shown {
                    index: view.current_index,
                    ..Shown::default()
                }
            }
        };

        if view.revealed_length > shown.revealed {
            let fresh: String = view.revealed_text.chars().skip(shown.revealed).collect();
            write!(out, "{fresh}")?;
            shown.revealed = view.revealed_length;
        }

        if view.interaction_active && !shown.interaction {
            if let Some(interaction) = &view.interaction {
                let prompt = interaction
                    .payload
                    .get("prompt")
                    .and_then(serde_json::Value::as_str)
                    .map_or_else(|| interaction.id.clone(), str::to_owned);
                writeln!(out)?;
                write!(out, "  ? {prompt} (d to continue)")?;
            }
        }
        shown.interaction = view.interaction_active;

        if view.stuck && !shown.stuck {
            writeln!(out)?;
            write!(out, "  (still there? r restarts, s finishes)")?;
        }
        shown.stuck = view.stuck;

        if completed && !shown.completed {
            writeln!(out)?;
            writeln!(out, "-- end --")?;
        }
        shown.completed = completed;

        self.shown = Some(shown);
        out.flush()
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Plays `engine` until it completes, the reader quits, or input ends with
/// nothing left to wait for. `store` is the engine's session store; `R`
/// purges every saved phase from it.
///
/// # Errors
///
/// Returns `AppError::Io` if reading input or writing output fails.
pub async fn run<R, W>(
    engine: &mut PlaybackEngine,
    store: &dyn SessionStore,
    input: R,
    out: &mut W,
) -> Result<Outcome, AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let start = Instant::now();
    let mut lines = input.lines();
    let mut input_open = true;
    let mut renderer = Renderer::new();

    info!(
        session_id = %engine.session_id(),
        progress_key = engine.progress_key(),
        "player started"
    );

    loop {
        engine.poll(elapsed_ms(start));
        if let Some(view) = engine.view() {
            renderer.render(&view, out)?;
        }
        if engine.state().is_completed() {
            return Ok(Outcome::Completed);
        }

        let wake = engine
            .next_deadline()
            .map(|ms| start + Duration::from_millis(ms));
        if !input_open && wake.is_none() {
            debug!("input closed with no timers pending");
            return Ok(Outcome::Idle);
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("input closed");
                    input_open = false;
                    continue;
                };
                engine.poll(elapsed_ms(start));
                match PlayerCommand::parse(&line) {
                    Some(PlayerCommand::Quit) => {
                        info!("quit requested");
                        return Ok(Outcome::Quit);
                    }
                    Some(command) => {
                        debug!(?command, "player command");
                        if command == PlayerCommand::ResetAll {
                            match progress::purge_all(store) {
                                Ok(removed) => info!(removed, "saved progress purged for every phase"),
                                Err(e) => warn!(error = %e, "could not purge saved progress"),
                            }
                        }
                        if let Some(command) = command.to_playback(engine.state()) {
                            engine.execute(command);
                        }
                    }
                    None => {
                        writeln!(out)?;
                        write!(out, "  (unknown command {:?}; try n b s r R p d q)", line.trim())?;
                    }
                }
            }
            () = wait_until(wake) => {}
        }
    }
}
