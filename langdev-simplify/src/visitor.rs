//! Open, type-keyed dispatch tables.
//!
//! A [`Dispatcher`] maps concrete Rust types to handler closures. Each
//! dispatcher has a name, so several independent tables (one per
//! serialization "language", say) can coexist.
//!
//! Rust has no inheritance graph to walk, so "is-a" relationships are
//! declared explicitly with [`Dispatcher::inherit`], together with the
//! upcast that turns a reference to the subtype into a reference to the
//! supertype. Lookup visits the type itself first, then its declared
//! parents depth-first, left to right, and stops at the first type with a
//! registered handler.
//!
//! Tables are filled during start-up and only read afterwards, so a
//! finished dispatcher can be shared across threads without locking.
//!
//! ```
//! use langdev_simplify::{Dispatcher, Visitable};
//!
//! struct Animal { name: &'static str }
//! struct Dog { animal: Animal }
//! impl Visitable for Dog {}
//!
//! fn dog_as_animal(dog: &Dog) -> &Animal { &dog.animal }
//!
//! let mut describe: Dispatcher<(), String> = Dispatcher::new("describe");
//! describe.register(|animal: &Animal, _: &()| format!("an animal called {}", animal.name));
//! describe.inherit::<Dog, Animal>(dog_as_animal);
//!
//! let dog = Dog { animal: Animal { name: "Baduk" } };
//! assert_eq!(describe.dispatch(&dog, &()).unwrap(), "an animal called Baduk");
//! ```

use crate::{DispatchError, Primitive};
use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::trace;

/// Runtime identity of a Rust type, with its name for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Upcasting helper implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn type_tag(&self) -> TypeTag;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }
}

/// A value that can flow through a [`Dispatcher`] and the simplifier.
///
/// Every method has a default, so domain types only need an empty
/// `impl Visitable for MyType {}` and a handler registration.
pub trait Visitable: AsAny {
    /// The value as an already-primitive scalar, if it is one.
    fn as_primitive(&self) -> Option<Primitive> {
        None
    }

    /// The elements of a homogeneous ordered collection.
    fn elements(&self) -> Option<Vec<&dyn Visitable>> {
        None
    }

    /// The wrapped value of a transparent wrapper (`Arc`, `Box`, `Some`).
    fn delegate(&self) -> Option<&dyn Visitable> {
        None
    }
}

type Handler<A, R> = Arc<dyn Fn(&dyn Any, &A) -> Option<R> + Send + Sync>;
type SequenceHandler<A, R> = Arc<dyn Fn(&[&dyn Visitable], &A) -> R + Send + Sync>;

trait Upcast: Send + Sync {
    fn upcast<'v>(&self, value: &'v dyn Any) -> Option<&'v dyn Any>;
}

struct UpcastFn<T, S>(fn(&T) -> &S);

impl<T: Any, S: Any> Upcast for UpcastFn<T, S> {
    fn upcast<'v>(&self, value: &'v dyn Any) -> Option<&'v dyn Any> {
        value.downcast_ref::<T>().map(|v| (self.0)(v) as &dyn Any)
    }
}

struct Parent {
    tag: TypeTag,
    upcast: Box<dyn Upcast>,
}

struct Registered<A, R> {
    tag: TypeTag,
    handler: Handler<A, R>,
}

/// A named table of per-type handlers taking extra arguments `A` and
/// producing `R`.
pub struct Dispatcher<A, R> {
    name: &'static str,
    handlers: HashMap<TypeId, Registered<A, R>>,
    parents: HashMap<TypeId, Vec<Parent>>,
    sequence: Option<SequenceHandler<A, R>>,
}

impl<A: 'static, R: 'static> Dispatcher<A, R> {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handlers: HashMap::new(),
            parents: HashMap::new(),
            sequence: None,
        }
    }

    /// The dispatcher's name, used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Registers `handler` for values of type `T`. Re-registering a type
    /// replaces the previous handler.
    pub fn register<T, F>(&mut self, handler: F) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &A) -> R + Send + Sync + 'static,
    {
        let tag = TypeTag::of::<T>();
        let erased: Handler<A, R> = Arc::new(move |value: &dyn Any, args: &A| {
            value.downcast_ref::<T>().map(|v| handler(v, args))
        });
        self.handlers.insert(
            tag.id,
            Registered {
                tag,
                handler: erased,
            },
        );
        self
    }

    /// Declares that `T` is-a `S`. Parents are tried in declaration order.
    pub fn inherit<T: Any, S: Any>(&mut self, upcast: fn(&T) -> &S) -> &mut Self {
        self.parents
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Parent {
                tag: TypeTag::of::<S>(),
                upcast: Box::new(UpcastFn(upcast)),
            });
        self
    }

    /// Registers the fallback for values that have no handler of their own
    /// but expose [`Visitable::elements`].
    pub fn register_sequence<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&[&dyn Visitable], &A) -> R + Send + Sync + 'static,
    {
        self.sequence = Some(Arc::new(handler));
        self
    }

    /// Returns true if `tag` or one of its declared ancestors has a handler.
    #[must_use]
    pub fn contains(&self, tag: TypeTag) -> bool {
        self.lookup(tag).is_ok()
    }

    /// Finds the handler for the most specific registered ancestor of `tag`.
    pub fn lookup(&self, tag: TypeTag) -> Result<Lookup<'_, A, R>, DispatchError> {
        let mut path = Vec::new();
        let mut seen = HashSet::from([tag.id]);
        match self.resolve(tag, &mut path, &mut seen) {
            Some(registered) => Ok(Lookup {
                requested: tag,
                path,
                registered,
            }),
            None => Err(DispatchError::Unregistered {
                visitor: self.name,
                type_name: tag.name,
            }),
        }
    }

    fn resolve<'d>(
        &'d self,
        tag: TypeTag,
        path: &mut Vec<&'d Parent>,
        seen: &mut HashSet<TypeId>,
    ) -> Option<&'d Registered<A, R>> {
        if let Some(registered) = self.handlers.get(&tag.id) {
            return Some(registered);
        }
        for parent in self.parents.get(&tag.id).into_iter().flatten() {
            if !seen.insert(parent.tag.id) {
                continue;
            }
            path.push(parent);
            if let Some(found) = self.resolve(parent.tag, path, seen) {
                return Some(found);
            }
            path.pop();
        }
        None
    }

    /// Invokes the handler matching `value`'s type, falling back to the
    /// sequence handler for collections.
    pub fn dispatch(&self, value: &dyn Visitable, args: &A) -> Result<R, DispatchError> {
        let tag = value.type_tag();
        match self.lookup(tag) {
            Ok(found) => found.call(value.as_any(), args),
            Err(err) => match (&self.sequence, value.elements()) {
                (Some(sequence), Some(elements)) => {
                    trace!(visitor = self.name, type_name = tag.name, "sequence fallback");
                    Ok(sequence(&elements, args))
                }
                _ => Err(err),
            },
        }
    }
}

impl<A, R> fmt::Debug for Dispatcher<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&str> = self.handlers.values().map(|r| r.tag.name).collect();
        types.sort_unstable();
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("types", &types)
            .field("sequence", &self.sequence.is_some())
            .finish()
    }
}

/// A resolved handler together with the upcasts leading to it.
pub struct Lookup<'d, A, R> {
    requested: TypeTag,
    path: Vec<&'d Parent>,
    registered: &'d Registered<A, R>,
}

impl<A, R> Lookup<'_, A, R> {
    /// The type the handler was registered for.
    #[must_use]
    pub fn matched(&self) -> TypeTag {
        self.registered.tag
    }

    /// Number of is-a edges between the requested and the matched type.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Upcasts `value` along the resolved path and calls the handler.
    pub fn call(&self, value: &dyn Any, args: &A) -> Result<R, DispatchError> {
        let mismatch = || DispatchError::TypeMismatch {
            expected: self.requested.name,
            matched: self.registered.tag.name,
        };
        let mut current = value;
        for parent in &self.path {
            current = parent.upcast.upcast(current).ok_or_else(mismatch)?;
        }
        trace!(
            requested = self.requested.name,
            matched = self.registered.tag.name,
            "dispatch"
        );
        (self.registered.handler)(current, args).ok_or_else(mismatch)
    }
}
