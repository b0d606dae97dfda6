//! Typewriter reveal: one more character of the current message per tick.
//!
//! The cursor itself lives in `PlaybackState::revealed_length`; these helpers
//! only compute the next cursor value and the visible prefix, so a paused
//! reveal resumes exactly where it stopped.

/// Outcome of advancing the cursor by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// More characters remain after this one.
    Partial(usize),
    /// The message is now fully revealed.
    Complete(usize),
}

/// Advances a cursor at `revealed` by one character of a `total`-character
/// message. A cursor already at or past the end stays complete.
#[must_use]
pub fn step(revealed: usize, total: usize) -> RevealStep {
    let next = revealed.saturating_add(1).min(total);
    if next >= total {
        RevealStep::Complete(total)
    } else {
        RevealStep::Partial(next)
    }
}

/// Returns the first `revealed` characters of `content`, cut on a character
/// boundary.
#[must_use]
pub fn visible_prefix(content: &str, revealed: usize) -> &str {
    content
        .char_indices()
        .nth(revealed)
        .map_or(content, |(byte_index, _)| &content[..byte_index])
}
