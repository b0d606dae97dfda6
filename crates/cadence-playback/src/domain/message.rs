//! Message queue records: narrative messages and interaction points.

use serde::{Deserialize, Serialize};

/// Presentation mood attached to a message. The engine never interprets it;
/// it is carried through to the view unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    /// No particular mood.
    #[default]
    Neutral,
    /// Enthusiastic, energetic.
    Excited,
    /// Blocked or annoyed.
    Frustrated,
    /// Looking forward to a good outcome.
    Hopeful,
    /// Friendly and welcoming.
    Warm,
    /// Supportive of the learner.
    Encouraging,
    /// Pleased with an achievement.
    Proud,
    /// Reflective.
    Thoughtful,
    /// Uneasy about something specific.
    Worried,
    /// Sure of the way forward.
    Confident,
    /// Sharing the learner's feelings.
    Empathetic,
    /// Reasoning through data.
    Analytical,
    /// Mildly troubled.
    Concerned,
    /// Nervous.
    Anxious,
    /// Let down by a result.
    Disappointed,
    /// Having just understood something.
    Enlightened,
    /// Surprised in a good way.
    Amazed,
}

impl Emotion {
    /// The lowercase tag used in scripts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Excited => "excited",
            Self::Frustrated => "frustrated",
            Self::Hopeful => "hopeful",
            Self::Warm => "warm",
            Self::Encouraging => "encouraging",
            Self::Proud => "proud",
            Self::Thoughtful => "thoughtful",
            Self::Worried => "worried",
            Self::Confident => "confident",
            Self::Empathetic => "empathetic",
            Self::Analytical => "analytical",
            Self::Concerned => "concerned",
            Self::Anxious => "anxious",
            Self::Disappointed => "disappointed",
            Self::Enlightened => "enlightened",
            Self::Amazed => "amazed",
        }
    }
}

fn default_show_avatar() -> bool {
    true
}

/// One unit of scripted text, revealed character by character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeMessage {
    /// Stable identifier supplied by the script author.
    pub id: String,
    /// Full text to reveal.
    pub content: String,
    /// Mood tag for the view layer.
    #[serde(default)]
    pub emotion: Emotion,
    /// Pause after full reveal before auto-advance; `None` uses the engine
    /// default.
    #[serde(default, alias = "delay", skip_serializing_if = "Option::is_none")]
    pub reveal_delay_ms: Option<u64>,
    /// Whether the view should show the character's avatar.
    #[serde(default = "default_show_avatar")]
    pub show_avatar: bool,
}

impl NarrativeMessage {
    /// Creates a neutral message with the avatar shown and no delay override.
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            emotion: Emotion::Neutral,
            reveal_delay_ms: None,
            show_avatar: true,
        }
    }

    /// Sets the mood tag.
    #[must_use]
    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = emotion;
        self
    }

    /// Overrides the post-reveal delay.
    #[must_use]
    pub fn with_reveal_delay_ms(mut self, delay_ms: u64) -> Self {
        self.reveal_delay_ms = Some(delay_ms);
        self
    }

    /// Hides the avatar for this message.
    #[must_use]
    pub fn without_avatar(mut self) -> Self {
        self.show_avatar = false;
        self
    }

    /// Length of `content` in characters, the unit the typewriter counts in.
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

/// A scripted pause that holds playback after a given message until the
/// host acknowledges it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionPoint {
    /// Identifier reported back when the interaction is dismissed.
    pub id: String,
    /// Index of the message after which this point blocks.
    #[serde(alias = "afterMessage")]
    pub after_message_index: usize,
    /// Opaque data surfaced to the host while the point is active.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl InteractionPoint {
    /// Creates an interaction point.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        after_message_index: usize,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            after_message_index,
            payload,
        }
    }
}
