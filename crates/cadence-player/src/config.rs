//! Player configuration read from the environment.

use std::path::PathBuf;

use crate::error::AppError;

/// Settings for one player run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Script to play.
    pub script_path: PathBuf,
    /// Namespace for saved progress.
    pub phase_key: String,
    /// Advance automatically after each reveal.
    pub auto_advance: bool,
    /// Overrides the character named in the script.
    pub character_name: Option<String>,
    /// Overrides the typewriter tick interval.
    pub tick_ms: Option<u64>,
}

impl PlayerConfig {
    /// Reads the configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no script is given or a value does not
    /// parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(std::env::args().nth(1), |key| std::env::var(key).ok())
    }

    /// Builds the configuration from a script argument and a variable lookup.
    /// The argument takes precedence over `CADENCE_SCRIPT`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if no script is given or a value does not
    /// parse.
    pub fn from_lookup(
        script_arg: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let script_path = script_arg
            .or_else(|| lookup("CADENCE_SCRIPT"))
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                AppError::Config(
                    "a script path must be given as the first argument or CADENCE_SCRIPT".into(),
                )
            })?;

        let auto_advance = match lookup("CADENCE_AUTO_ADVANCE").as_deref() {
            None | Some("") => false,
            Some(value) => parse_bool(value).ok_or_else(|| {
                AppError::Config(format!(
                    "CADENCE_AUTO_ADVANCE must be true or false, got {value:?}"
                ))
            })?,
        };

        let tick_ms = lookup("CADENCE_TICK_MS")
            .filter(|value| !value.is_empty())
            .map(|value| {
                value
                    .parse::<u64>()
                    .map_err(|e| AppError::Config(format!("CADENCE_TICK_MS must be a valid u64: {e}")))
            })
            .transpose()?;

        Ok(Self {
            script_path,
            phase_key: lookup("CADENCE_PHASE_KEY")
                .filter(|key| !key.is_empty())
                .unwrap_or_else(|| "default".to_owned()),
            auto_advance,
            character_name: lookup("CADENCE_CHARACTER").filter(|name| !name.is_empty()),
            tick_ms,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
