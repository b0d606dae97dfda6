//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The backing key/value store could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// A stored value could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),
}
