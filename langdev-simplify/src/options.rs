//! Per-call simplification options.

use crate::ident::{self, IdentifierMap};
use crate::{Dispatcher, Primitive, PrimitiveKind, SimplifyError, SimplifyResult, Visitable};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The dispatch table consulted by [`simplify`](crate::simplify).
pub type Transform = Dispatcher<SimplifyOptions, SimplifyResult<Primitive>>;

/// Final remap applied to a simplified value of a given kind.
pub type Encoder = fn(Primitive) -> Primitive;

/// Resolves the public URL of a value, if it has one.
pub type UrlResolver = Arc<dyn Fn(&dyn Visitable) -> Option<String> + Send + Sync>;

/// Extension option names accepted by [`SimplifyOptionsBuilder::extra`].
const UNDER_LIST_KEYS: [&str; 3] = ["under list", "underList", "under_list"];

/// Kind → encoder table applied after every simplification step.
#[derive(Debug, Clone, Default)]
pub struct TypeEncoders(HashMap<PrimitiveKind, Encoder>);

impl TypeEncoders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the encoder for `kind`.
    #[must_use]
    pub fn with(mut self, kind: PrimitiveKind, encoder: Encoder) -> Self {
        self.0.insert(kind, encoder);
        self
    }

    #[must_use]
    pub fn get(&self, kind: PrimitiveKind) -> Option<Encoder> {
        self.0.get(&kind).copied()
    }

    /// Remaps `value` if an encoder is registered for its kind.
    #[must_use]
    pub fn apply(&self, value: Primitive) -> Primitive {
        match self.get(value.kind()) {
            Some(encoder) => encoder(value),
            None => value,
        }
    }
}

/// Encodes dates and timestamps as ISO-8601 strings.
#[must_use]
pub fn isoformat(value: Primitive) -> Primitive {
    match value.isoformat() {
        Some(text) => Primitive::String(text),
        None => value,
    }
}

/// Encodes `Null` as `false`, for formats without a null literal.
#[must_use]
pub fn null_as_false(value: Primitive) -> Primitive {
    match value {
        Primitive::Null => Primitive::Bool(false),
        other => other,
    }
}

/// Options threaded through one top-level [`simplify`](crate::simplify)
/// call.
///
/// Cloning is cheap. The only field that changes during the descent is
/// `under_list`, and only on copies made by [`SimplifyOptions::nested`].
#[derive(Clone)]
pub struct SimplifyOptions {
    transform: Arc<Transform>,
    identifier_map: IdentifierMap,
    type_encoders: TypeEncoders,
    url_resolver: Option<UrlResolver>,
    viewer: Option<Arc<dyn Any + Send + Sync>>,
    under_list: bool,
}

impl SimplifyOptions {
    /// Starts building options around a dispatch table.
    #[must_use]
    pub fn builder(transform: Arc<Transform>) -> SimplifyOptionsBuilder {
        SimplifyOptionsBuilder {
            options: Self {
                transform,
                identifier_map: ident::snake,
                type_encoders: TypeEncoders::default(),
                url_resolver: None,
                viewer: None,
                under_list: false,
            },
        }
    }

    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[must_use]
    pub fn type_encoders(&self) -> &TypeEncoders {
        &self.type_encoders
    }

    /// True when the value being simplified is an element of a list.
    #[must_use]
    pub fn under_list(&self) -> bool {
        self.under_list
    }

    /// A copy marked as being inside a list.
    #[must_use]
    pub fn nested(&self) -> Self {
        Self {
            under_list: true,
            ..self.clone()
        }
    }

    /// Applies the identifier map to a label.
    #[must_use]
    pub fn key(&self, label: &str) -> String {
        (self.identifier_map)(label)
    }

    /// Consults the URL resolver, if any.
    #[must_use]
    pub fn url_for(&self, value: &dyn Visitable) -> Option<String> {
        self.url_resolver.as_ref().and_then(|resolve| resolve(value))
    }

    /// True when a URL resolver is configured.
    #[must_use]
    pub fn resolves_urls(&self) -> bool {
        self.url_resolver.is_some()
    }

    /// The requesting identity, if it is a `T`.
    #[must_use]
    pub fn viewer<T: Any>(&self) -> Option<&T> {
        self.viewer.as_deref().and_then(|v| v.downcast_ref::<T>())
    }

    /// True when the requesting identity equals `identity`. Anonymous
    /// requests never match.
    #[must_use]
    pub fn is_viewer<T: Any + PartialEq>(&self, identity: &T) -> bool {
        self.viewer::<T>() == Some(identity)
    }

    /// Shorthand for [`simplify`](crate::simplify) with these options.
    pub fn simplify(&self, value: &dyn Visitable) -> SimplifyResult<Primitive> {
        crate::simplify(value, self)
    }
}

impl fmt::Debug for SimplifyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimplifyOptions")
            .field("transform", &self.transform.name())
            .field("type_encoders", &self.type_encoders)
            .field("url_resolver", &self.url_resolver.is_some())
            .field("viewer", &self.viewer.is_some())
            .field("under_list", &self.under_list)
            .finish()
    }
}

/// Builder for [`SimplifyOptions`].
pub struct SimplifyOptionsBuilder {
    options: SimplifyOptions,
}

impl SimplifyOptionsBuilder {
    #[must_use]
    pub fn identifier_map(mut self, map: IdentifierMap) -> Self {
        self.options.identifier_map = map;
        self
    }

    #[must_use]
    pub fn type_encoders(mut self, encoders: TypeEncoders) -> Self {
        self.options.type_encoders = encoders;
        self
    }

    #[must_use]
    pub fn url_resolver<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&dyn Visitable) -> Option<String> + Send + Sync + 'static,
    {
        self.options.url_resolver = Some(Arc::new(resolve));
        self
    }

    /// Sets the requesting identity. `None` means anonymous.
    #[must_use]
    pub fn viewer<T: Any + Send + Sync>(mut self, viewer: Option<T>) -> Self {
        self.options.viewer = viewer.map(|v| Arc::new(v) as Arc<dyn Any + Send + Sync>);
        self
    }

    #[must_use]
    pub fn under_list(mut self, under_list: bool) -> Self {
        self.options.under_list = under_list;
        self
    }

    /// Sets a free-form extension flag by name.
    ///
    /// This is the one place loosely named options enter; names no handler
    /// understands are rejected.
    pub fn extra(self, key: &str, value: bool) -> SimplifyResult<Self> {
        if UNDER_LIST_KEYS.contains(&key) {
            Ok(self.under_list(value))
        } else {
            Err(SimplifyError::UnknownOption(key.to_string()))
        }
    }

    #[must_use]
    pub fn build(self) -> SimplifyOptions {
        self.options
    }
}
