//! Error types for rendering and content negotiation.

use langdev_model::ApplicationKey;
use langdev_simplify::SimplifyError;
use thiserror::Error;

/// Result type for encoders and templates.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for negotiated rendering.
pub type NegotiationResult<T> = Result<T, NegotiationError>;

/// Errors raised while turning a value into response bytes.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Simplify(#[from] SimplifyError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("plist encoding failed: {0}")]
    Plist(#[from] plist::Error),

    /// The negotiated template does not exist.
    #[error("template {0:?} not found")]
    TemplateNotFound(String),

    /// A template was found but could not render the value it was given.
    #[error("template {name:?} failed: {reason}")]
    Template { name: String, reason: String },
}

/// Errors raised by the content negotiator.
#[derive(Debug, Error)]
pub enum NegotiationError {
    /// None of the acceptable media types can be produced.
    #[error("none of {accept:?} is available")]
    NotAcceptable { accept: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors raised by the SSO delegation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SsoError {
    /// No application is registered under the key.
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationKey),

    /// No member matches the submitted login name or email address.
    #[error("user {0:?} not found")]
    UserNotFound(String),
}
