//! Entity model for LangDev.
//!
//! Defines the domain types every other crate reads:
//! - [`User`]: registered members, with login/email validation
//! - [`Post`] and [`Comment`]: the threaded forum
//! - [`Application`]: third-party SSO clients and their HMAC digest
//!
//! Every entity and key implements [`langdev_simplify::Visitable`], so the
//! whole model can be handed to the simplifier.
//!
//! Entities here are read-only snapshots handed over by the persistence
//! layer. Relationships are shared through `Arc` so a post and the
//! comments listed under it can point at the same author.

mod error;
mod forum;
mod ids;
mod thirdparty;
mod user;
mod visitable;

pub use error::{ModelError, ModelResult};
pub use forum::{Comment, Post};
pub use ids::{ApplicationKey, CommentId, PostId, UserId};
pub use thirdparty::{Application, DIGEST_SIZE, sso_digest};
pub use user::{User, is_login, validate_email, validate_login};
