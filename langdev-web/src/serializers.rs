//! Simplifier-backed wire encoders.
//!
//! - [`JsonEncoder`]: camelCase keys, dates as ISO-8601 strings
//! - [`PlistEncoder`]: XML property lists, PascalCase keys, dates as
//!   ISO-8601 strings and `null` as `false`

use crate::error::RenderResult;
use crate::transform::transform;
use langdev_model::UserId;
use langdev_simplify::{
    Primitive, PrimitiveKind, SimplifyOptions, Transform, TypeEncoders, UrlResolver, Visitable,
    ident::{self, IdentifierMap},
    isoformat, null_as_false,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Encodes a value for one viewer.
pub trait Encode: Send + Sync {
    /// Simplifies `value` as seen by `viewer` and serializes the result.
    fn encode(&self, value: &dyn Visitable, viewer: Option<UserId>) -> RenderResult<Vec<u8>>;
}

/// Simplification settings shared by the encoders.
#[derive(Clone)]
struct Profile {
    transform: Arc<Transform>,
    identifier_map: IdentifierMap,
    type_encoders: TypeEncoders,
    url_resolver: Option<UrlResolver>,
}

impl Profile {
    fn new(identifier_map: IdentifierMap, type_encoders: TypeEncoders) -> Self {
        Self {
            transform: transform(),
            identifier_map,
            type_encoders,
            url_resolver: None,
        }
    }

    fn simplify(&self, value: &dyn Visitable, viewer: Option<UserId>) -> RenderResult<Primitive> {
        let mut builder = SimplifyOptions::builder(Arc::clone(&self.transform))
            .identifier_map(self.identifier_map)
            .type_encoders(self.type_encoders.clone())
            .viewer(viewer);
        if let Some(resolve) = self.url_resolver.clone() {
            builder = builder.url_resolver(move |value: &dyn Visitable| resolve(value));
        }
        Ok(builder.build().simplify(value)?)
    }
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("transform", &self.transform.name())
            .field("type_encoders", &self.type_encoders)
            .field("url_resolver", &self.url_resolver.is_some())
            .finish()
    }
}

macro_rules! profile_setters {
    ($name:ident) => {
        impl $name {
            /// Replaces the entity transform.
            #[must_use]
            pub fn with_transform(mut self, transform: Arc<Transform>) -> Self {
                self.profile.transform = transform;
                self
            }

            /// Adds a `link` field to every entity the resolver knows.
            #[must_use]
            pub fn with_url_resolver(mut self, resolver: UrlResolver) -> Self {
                self.profile.url_resolver = Some(resolver);
                self
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

/// Serializes values into JSON (`application/json`).
#[derive(Debug, Clone)]
pub struct JsonEncoder {
    profile: Profile,
}

impl JsonEncoder {
    #[must_use]
    pub fn new() -> Self {
        let type_encoders = TypeEncoders::new()
            .with(PrimitiveKind::DateTime, isoformat)
            .with(PrimitiveKind::Date, isoformat);
        Self {
            profile: Profile::new(ident::camel, type_encoders),
        }
    }
}

profile_setters!(JsonEncoder);

impl Encode for JsonEncoder {
    fn encode(&self, value: &dyn Visitable, viewer: Option<UserId>) -> RenderResult<Vec<u8>> {
        let tree = self.profile.simplify(value, viewer)?;
        let bytes = serde_json::to_vec(&tree)?;
        debug!(len = bytes.len(), "encoded JSON");
        Ok(bytes)
    }
}

/// Serializes values into XML property lists (`application/plist+xml`).
#[derive(Debug, Clone)]
pub struct PlistEncoder {
    profile: Profile,
}

impl PlistEncoder {
    #[must_use]
    pub fn new() -> Self {
        // Property lists have no null literal.
        let type_encoders = TypeEncoders::new()
            .with(PrimitiveKind::DateTime, isoformat)
            .with(PrimitiveKind::Date, isoformat)
            .with(PrimitiveKind::Null, null_as_false);
        Self {
            profile: Profile::new(ident::pascal, type_encoders),
        }
    }
}

profile_setters!(PlistEncoder);

impl Encode for PlistEncoder {
    fn encode(&self, value: &dyn Visitable, viewer: Option<UserId>) -> RenderResult<Vec<u8>> {
        let tree = self.profile.simplify(value, viewer)?;
        let mut bytes = Vec::new();
        to_plist(tree).to_writer_xml(&mut bytes)?;
        debug!(len = bytes.len(), "encoded plist");
        Ok(bytes)
    }
}

fn to_plist(value: Primitive) -> plist::Value {
    match value {
        Primitive::Null => plist::Value::Boolean(false),
        Primitive::Bool(b) => plist::Value::Boolean(b),
        Primitive::Integer(i) => plist::Value::Integer(i.into()),
        Primitive::Float(f) => plist::Value::Real(f),
        Primitive::String(s) => plist::Value::String(s),
        date @ (Primitive::Date(_) | Primitive::DateTime(_)) => {
            plist::Value::String(date.isoformat().unwrap_or_default())
        }
        Primitive::Sequence(items) => plist::Value::Array(items.into_iter().map(to_plist).collect()),
        Primitive::Mapping(map) => {
            let mut dict = plist::Dictionary::new();
            for (key, item) in map {
                dict.insert(key, to_plist(item));
            }
            plist::Value::Dictionary(dict)
        }
    }
}
