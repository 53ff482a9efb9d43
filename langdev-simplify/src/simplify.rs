//! Recursive simplification of object graphs.

use crate::{
    DispatchError, Primitive, SimplifyError, SimplifyOptions, SimplifyResult, Transform,
    Visitable,
};
use tracing::debug;

/// Creates a dispatch table with the sequence fallback already in place.
#[must_use]
pub fn new_transform(name: &'static str) -> Transform {
    let mut transform = Transform::new(name);
    transform.register_sequence(simplify_sequence);
    transform
}

/// Simplifies each element with `under_list` set.
pub fn simplify_sequence(
    elements: &[&dyn Visitable],
    options: &SimplifyOptions,
) -> SimplifyResult<Primitive> {
    let nested = options.nested();
    elements
        .iter()
        .map(|element| simplify(*element, &nested))
        .collect::<SimplifyResult<Vec<_>>>()
        .map(Primitive::Sequence)
}

/// Simplifies `value` into a [`Primitive`] tree.
///
/// 1. A value whose type (or declared ancestor) has a handler in
///    `options.transform()` is shaped by that handler.
/// 2. Otherwise a collection becomes a sequence of simplified elements,
///    each simplified with `under_list` set.
/// 3. Otherwise a scalar passes through unchanged.
///
/// The result is then remapped by the type encoder registered for its
/// kind, if any. Transparent wrappers (`Arc`, `Box`, `Some`) are looked
/// through first.
pub fn simplify(value: &dyn Visitable, options: &SimplifyOptions) -> SimplifyResult<Primitive> {
    let mut value = value;
    while let Some(inner) = value.delegate() {
        value = inner;
    }
    let intermediate = match options.transform().dispatch(value, options) {
        Ok(shaped) => shaped?,
        Err(DispatchError::Unregistered { .. }) => match value.as_primitive() {
            Some(scalar) => scalar,
            None => {
                let type_name = value.type_tag().name();
                debug!(type_name, "no handler for value");
                return Err(SimplifyError::Unsupported { type_name });
            }
        },
        Err(err) => return Err(err.into()),
    };
    Ok(options.type_encoders().apply(intermediate))
}
