//! Web-facing serialization for LangDev.
//!
//! Wires the entity model into the simplifier and picks a wire format per
//! request:
//! - [`transform`]: field shapes of users, posts, comments and
//!   applications, with the owner-only and list/detail field policies
//! - [`JsonEncoder`] and [`PlistEncoder`]: simplifier-backed encoders
//! - [`ContentNegotiator`]: `Accept`-driven choice between encoders and
//!   templates
//! - [`TemplateRenderer`]: the boundary to the HTML template layer
//! - [`authenticate`]: the third-party SSO delegation check

mod error;
pub mod negotiation;
pub mod serializers;
pub mod sso;
pub mod templates;
mod transform;

pub use error::{NegotiationError, NegotiationResult, RenderError, RenderResult, SsoError};
pub use negotiation::{
    ContentNegotiator, ContentTypeRegistry, MediaRange, NegotiatorConfig, Page, Rendered, Target,
    parse_accept,
};
pub use serializers::{Encode, JsonEncoder, PlistEncoder};
pub use sso::{EntityStore, SsoOutcome, SsoRequest, authenticate};
pub use templates::{TemplateRenderer, TemplateSet};
pub use transform::{build_transform, transform};
