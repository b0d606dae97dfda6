//! Cadence player: error types.

use cadence_core::error::DomainError;
use thiserror::Error;

/// Startup and runtime errors for the player.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Reading the script or writing to the terminal failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON script could not be parsed.
    #[error("invalid JSON script: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML script could not be parsed.
    #[error("invalid YAML script: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The script parsed but its content is unusable.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_message() {
        let err = AppError::Config("CADENCE_TICK_MS must be a number".into());

        assert_eq!(
            err.to_string(),
            "configuration error: CADENCE_TICK_MS must be a number"
        );
    }

    #[test]
    fn test_domain_error_is_transparent() {
        let err = AppError::from(DomainError::Validation("duplicate message id: m1".into()));

        assert_eq!(err.to_string(), "validation error: duplicate message id: m1");
    }
}
