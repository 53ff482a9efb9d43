//! Generic object simplification for LangDev.
//!
//! Turns arbitrarily typed domain objects into a format-agnostic
//! [`Primitive`] tree that JSON, property-list and similar encoders can
//! walk exhaustively:
//! - [`Dispatcher`]: named, open type → handler tables with declared
//!   ancestor fallback and a sequence fallback
//! - [`ident`]: snake_case, PascalCase and camelCase key naming
//! - [`SimplifyOptions`]: identifier map, type encoders, URL resolver,
//!   viewer identity and the `under_list` context flag
//! - [`simplify`]: the recursive descent itself
//!
//! Nothing here knows about concrete entities; callers register their
//! handlers into a [`Transform`] at start-up and share it read-only.

mod error;
pub mod ident;
mod options;
mod primitive;
mod simplify;
mod visitor;

pub use error::{DispatchError, SimplifyError, SimplifyResult};
pub use options::{
    Encoder, SimplifyOptions, SimplifyOptionsBuilder, Transform, TypeEncoders, UrlResolver,
    isoformat, null_as_false,
};
pub use primitive::{Mapping, Primitive, PrimitiveKind};
pub use simplify::{new_transform, simplify, simplify_sequence};
pub use visitor::{AsAny, Dispatcher, Lookup, TypeTag, Visitable};
