//! Forum posts and threaded comments.

use crate::{CommentId, PostId, User};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// A forum post, as loaded by the persistence layer.
///
/// `replies` holds the top-level comments of the thread, each carrying its
/// own nested replies.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub author: Arc<User>,
    pub title: String,
    pub body: String,
    pub sticky: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub replies: Vec<Arc<Comment>>,
}

impl Post {
    /// Number of comments directly on the post (no parent comment).
    #[must_use]
    pub fn replies_count(&self) -> u64 {
        self.replies.len() as u64
    }

    /// Number of comments in the whole thread, at any depth.
    #[must_use]
    pub fn comments_count(&self) -> u64 {
        self.replies.iter().map(|c| 1 + c.descendants_count()).sum()
    }
}

/// A comment on a post, optionally replying to another comment.
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    /// The post itself, when it was loaded alongside.
    pub post: Option<Arc<Post>>,
    pub parent: Option<CommentId>,
    pub author: Arc<User>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<Arc<Comment>>,
}

impl Comment {
    #[must_use]
    pub fn replies_count(&self) -> u64 {
        self.replies.len() as u64
    }

    fn descendants_count(&self) -> u64 {
        self.replies.iter().map(|c| 1 + c.descendants_count()).sum()
    }
}
