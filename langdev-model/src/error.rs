//! Error types for the entity model.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when entity fields fail validation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Login name contains forbidden characters or has a bad length.
    #[error("{0:?} is an invalid login name")]
    InvalidLogin(String),

    /// Email address is malformed.
    #[error("{0:?} is an invalid email address")]
    InvalidEmail(String),
}
