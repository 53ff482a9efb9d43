//! Simplifier hooks for entities and their keys.
//!
//! Entities carry no primitive form of their own; their shape comes from
//! the handlers registered in the web layer. Keys simplify to their raw
//! value.

use crate::{Application, ApplicationKey, Comment, CommentId, Post, PostId, User, UserId};
use langdev_simplify::{Primitive, Visitable};

impl Visitable for User {}
impl Visitable for Post {}
impl Visitable for Comment {}
impl Visitable for Application {}

impl Visitable for UserId {
    fn as_primitive(&self) -> Option<Primitive> {
        Some(Primitive::Integer(self.get()))
    }
}

impl Visitable for PostId {
    fn as_primitive(&self) -> Option<Primitive> {
        Some(Primitive::Integer(self.get()))
    }
}

impl Visitable for CommentId {
    fn as_primitive(&self) -> Option<Primitive> {
        Some(Primitive::Integer(self.get()))
    }
}

impl Visitable for ApplicationKey {
    fn as_primitive(&self) -> Option<Primitive> {
        Some(Primitive::String(self.as_str().to_string()))
    }
}
