//! Error types for dispatch and simplification.

use thiserror::Error;

/// Result type for simplification.
pub type SimplifyResult<T> = Result<T, SimplifyError>;

/// Errors raised by a [`Dispatcher`](crate::Dispatcher).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Neither the type nor any declared ancestor has a handler.
    #[error("{type_name} does not match for the visitor {visitor:?}")]
    Unregistered {
        visitor: &'static str,
        type_name: &'static str,
    },

    /// A handler received a value it was not registered for. Indicates an
    /// upcast declared with the wrong types.
    #[error("handler for {matched} cannot accept a {expected}")]
    TypeMismatch {
        expected: &'static str,
        matched: &'static str,
    },
}

/// Errors raised while simplifying a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimplifyError {
    /// The value has no handler, is not a collection and is not primitive.
    #[error("cannot simplify a value of type {type_name}")]
    Unsupported { type_name: &'static str },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// An extension option name that no handler understands.
    #[error("unknown simplification option {0:?}")]
    UnknownOption(String),
}
