//! Narrative scripts: the messages and interaction points for one phase.

use std::collections::HashSet;
use std::path::Path;

use cadence_core::error::DomainError;
use cadence_playback::application::config::PlaybackTiming;
use cadence_playback::{InteractionPoint, NarrativeMessage, PlaybackConfig};
use serde::Deserialize;
use tracing::{info, warn};

use crate::config::PlayerConfig;
use crate::error::AppError;

/// On-disk encoding of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptFormat {
    /// `.json` and anything unrecognised.
    Json,
    /// `.yaml` / `.yml`.
    Yaml,
}

impl ScriptFormat {
    /// Picks the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Json,
        }
    }
}

/// A parsed script file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    /// Speaker shown in front of each message.
    #[serde(default)]
    pub character_name: Option<String>,
    /// Messages in playback order.
    pub messages: Vec<NarrativeMessage>,
    /// Scripted pauses between messages.
    #[serde(default)]
    pub interaction_points: Vec<InteractionPoint>,
}

impl Script {
    /// Parses and validates `source`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Json` or `AppError::Yaml` if the text does not parse,
    /// and `AppError::Domain` if message ids are blank or repeated.
    pub fn parse(source: &str, format: ScriptFormat) -> Result<Self, AppError> {
        let script: Self = match format {
            ScriptFormat::Json => serde_json::from_str(source)?,
            ScriptFormat::Yaml => serde_yaml::from_str(source)?,
        };
        script.validate()?;
        Ok(script)
    }

    /// Reads, parses and validates the script at `path`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file cannot be read, otherwise as
    /// `Script::parse`.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let source = std::fs::read_to_string(path)?;
        let script = Self::parse(&source, ScriptFormat::from_path(path))?;
        info!(
            path = %path.display(),
            messages = script.messages.len(),
            interaction_points = script.interaction_points.len(),
            "script loaded"
        );
        Ok(script)
    }

    /// Checks that every message has a unique, non-blank id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` naming the first offending id.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for (index, message) in self.messages.iter().enumerate() {
            if message.id.trim().is_empty() {
                return Err(DomainError::Validation(format!(
                    "message {index} has a blank id"
                )));
            }
            if !seen.insert(message.id.as_str()) {
                return Err(DomainError::Validation(format!(
                    "duplicate message id: {}",
                    message.id
                )));
            }
        }
        if self.messages.is_empty() {
            warn!("script has no messages; nothing will play");
        }
        Ok(())
    }

    /// Splits the script into the engine's message queue and configuration.
    #[must_use]
    pub fn into_playback(self, config: &PlayerConfig) -> (Vec<NarrativeMessage>, PlaybackConfig) {
        let mut playback = PlaybackConfig::default()
            .with_phase_key(config.phase_key.clone())
            .with_auto_advance(config.auto_advance)
            .with_interaction_points(self.interaction_points);
        if let Some(name) = config.character_name.clone().or(self.character_name) {
            playback = playback.with_character_name(name);
        }
        if let Some(tick_ms) = config.tick_ms {
            let timing = PlaybackTiming {
                tick_ms,
                ..playback.timing
            };
            playback = playback.with_timing(timing);
        }
        (self.messages, playback)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use cadence_playback::Emotion;

    const YAML: &str = r#"
characterName: Maya
messages:
  - id: welcome
    content: "Hi there!"
    emotion: excited
  - id: explain
    content: Let's look at the numbers.
    emotion: analytical
    delay: 2500
    showAvatar: false
interactionPoints:
  - id: reflect
    afterMessage: 0
    payload:
      prompt: How are you feeling?
"#;

    fn player_config() -> PlayerConfig {
        PlayerConfig {
            script_path: PathBuf::from("intro.yaml"),
            phase_key: "intro".to_owned(),
            auto_advance: true,
            character_name: None,
            tick_ms: None,
        }
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(ScriptFormat::from_path(Path::new("a.yaml")), ScriptFormat::Yaml);
        assert_eq!(ScriptFormat::from_path(Path::new("a.YML")), ScriptFormat::Yaml);
        assert_eq!(ScriptFormat::from_path(Path::new("a.json")), ScriptFormat::Json);
        assert_eq!(ScriptFormat::from_path(Path::new("script")), ScriptFormat::Json);
    }

    #[test]
    fn test_parse_yaml_script() {
        // Arrange / Act
        let script = Script::parse(YAML, ScriptFormat::Yaml).unwrap();

        // Assert
        assert_eq!(script.character_name.as_deref(), Some("Maya"));
        assert_eq!(script.messages.len(), 2);
        assert_eq!(script.messages[0].emotion, Emotion::Excited);
        assert_eq!(script.messages[1].reveal_delay_ms, Some(2_500));
        assert!(!script.messages[1].show_avatar);
        assert_eq!(script.interaction_points[0].after_message_index, 0);
        assert_eq!(script.interaction_points[0].payload["prompt"], "How are you feeling?");
    }

    #[test]
    fn test_parse_json_script_without_optional_sections() {
        let json = r#"{ "messages": [ { "id": "m1", "content": "Hello" } ] }"#;

        let script = Script::parse(json, ScriptFormat::Json).unwrap();

        assert_eq!(script.character_name, None);
        assert!(script.interaction_points.is_empty());
        assert_eq!(script.messages[0].emotion, Emotion::Neutral);
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let json = r#"{ "messages": [
            { "id": "m1", "content": "a" },
            { "id": "m1", "content": "b" }
        ] }"#;

        let result = Script::parse(json, ScriptFormat::Json);

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Validation(message))) if message.contains("m1")
        ));
    }

    #[test]
    fn test_malformed_script_is_a_parse_error() {
        assert!(matches!(
            Script::parse("{ not json", ScriptFormat::Json),
            Err(AppError::Json(_))
        ));
        assert!(matches!(
            Script::parse("messages: [", ScriptFormat::Yaml),
            Err(AppError::Yaml(_))
        ));
    }

    #[test]
    fn test_into_playback_applies_overrides() {
        let script = Script::parse(YAML, ScriptFormat::Yaml).unwrap();
        let mut config = player_config();
        config.character_name = Some("Ada".to_owned());
        config.tick_ms = Some(5);

        let (messages, playback) = script.into_playback(&config);

        assert_eq!(messages.len(), 2);
        assert_eq!(playback.phase_key, "intro");
        assert!(playback.auto_advance);
        assert_eq!(playback.character_name, "Ada");
        assert_eq!(playback.timing.tick_ms, 5);
        assert_eq!(playback.interaction_points.len(), 1);
    }

    #[test]
    fn test_into_playback_uses_script_character() {
        let script = Script::parse(YAML, ScriptFormat::Yaml).unwrap();

        let (_, playback) = script.into_playback(&player_config());

        assert_eq!(playback.character_name, "Maya");
        assert_eq!(playback.timing, PlaybackTiming::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let result = Script::load(Path::new("does/not/exist.yaml"));

        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
