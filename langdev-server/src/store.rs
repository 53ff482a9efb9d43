//! In-memory entity store loaded from a JSON seed document.
//!
//! The seed lists flat records with foreign keys:
//!
//! ```json
//! {
//!   "users": [{"id": 1, "login": "dahlia", "name": "Hong", "password_hash": "...",
//!              "created_at": "2010-08-01T09:00:00Z"}],
//!   "posts": [{"id": 1, "author_id": 1, "title": "Hello", "body": "...",
//!              "created_at": "2010-08-02T09:00:00Z"}],
//!   "comments": [{"id": 1, "post_id": 1, "author_id": 1, "body": "...",
//!                 "created_at": "2010-08-03T09:00:00Z"}],
//!   "applications": [{"key": "...", "secret_key": "...", "owner_id": 1,
//!                     "title": "...", "description": "...", "url": "...",
//!                     "created_at": "2010-08-04T09:00:00Z"}]
//! }
//! ```
//!
//! Loading resolves the keys into shared snapshots once; the store is
//! read-only afterwards.

use chrono::{DateTime, Utc};
use langdev_model::{
    Application, ApplicationKey, Comment, CommentId, ModelError, Post, PostId, User, UserId,
    validate_email, validate_login,
};
use langdev_web::EntityStore;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Result type for store loading.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while loading a seed document.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed seed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] ModelError),

    /// Two records of one kind share a key.
    #[error("duplicate {kind} {id}")]
    Duplicate { kind: &'static str, id: String },

    #[error("{kind} {id} refers to unknown user {user}")]
    UnknownUser {
        kind: &'static str,
        id: String,
        user: UserId,
    },

    #[error("comment {comment} refers to unknown post {post}")]
    UnknownPost { comment: CommentId, post: PostId },

    /// The parent comment is missing or belongs to another post.
    #[error("comment {comment} replies to {parent}, which is not on the same post")]
    UnknownParent {
        comment: CommentId,
        parent: CommentId,
    },

    #[error("comment {0} is part of a reply cycle")]
    ReplyCycle(CommentId),
}

#[derive(Debug, Deserialize)]
struct Seed {
    #[serde(default)]
    users: Vec<UserRecord>,
    #[serde(default)]
    posts: Vec<PostRecord>,
    #[serde(default)]
    comments: Vec<CommentRecord>,
    #[serde(default)]
    applications: Vec<ApplicationRecord>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: UserId,
    login: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    url: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    id: PostId,
    author_id: UserId,
    title: String,
    body: String,
    #[serde(default)]
    sticky: bool,
    created_at: DateTime<Utc>,
    #[serde(default)]
    modified_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    id: CommentId,
    post_id: PostId,
    #[serde(default)]
    parent_id: Option<CommentId>,
    author_id: UserId,
    body: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ApplicationRecord {
    key: ApplicationKey,
    secret_key: String,
    owner_id: UserId,
    title: String,
    description: String,
    url: String,
    created_at: DateTime<Utc>,
}

/// Read-only entity snapshots.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: HashMap<String, Arc<User>>,
    /// Sticky posts first, then newest first.
    posts: Vec<Arc<Post>>,
    posts_by_id: HashMap<PostId, Arc<Post>>,
    /// Comment detail snapshots, with their post attached.
    comments: HashMap<CommentId, Arc<Comment>>,
    applications: HashMap<ApplicationKey, Arc<Application>>,
}

impl MemoryStore {
    /// Reads and resolves the seed document at `path`.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Resolves a seed document.
    pub fn from_json(text: &str) -> StoreResult<Self> {
        let seed: Seed = serde_json::from_str(text)?;
        Self::from_seed(seed)
    }

    fn from_seed(seed: Seed) -> StoreResult<Self> {
        let users = build_users(&seed)?;
        let by_id: HashMap<UserId, Arc<User>> =
            users.values().map(|u| (u.id, Arc::clone(u))).collect();
        let author = |kind: &'static str, id: String, user: UserId| {
            by_id
                .get(&user)
                .cloned()
                .ok_or(StoreError::UnknownUser { kind, id, user })
        };

        let threads = build_threads(&seed, &author)?;

        let mut posts = Vec::with_capacity(seed.posts.len());
        let mut posts_by_id = HashMap::new();
        for record in &seed.posts {
            let post = Arc::new(Post {
                id: record.id,
                author: author("post", record.id.to_string(), record.author_id)?,
                title: record.title.clone(),
                body: record.body.clone(),
                sticky: record.sticky,
                created_at: record.created_at,
                modified_at: record.modified_at.unwrap_or(record.created_at),
                replies: threads.roots.get(&record.id).cloned().unwrap_or_default(),
            });
            if posts_by_id.insert(post.id, Arc::clone(&post)).is_some() {
                return Err(duplicate("post", post.id));
            }
            posts.push(post);
        }
        posts.sort_by(|a, b| {
            b.sticky
                .cmp(&a.sticky)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });

        let comments = threads
            .built
            .into_iter()
            .map(|(id, comment)| {
                let detail = Comment {
                    post: posts_by_id.get(&comment.post_id).cloned(),
                    ..(*comment).clone()
                };
                (id, Arc::new(detail))
            })
            .collect();

        let mut applications = HashMap::new();
        for record in seed.applications {
            let app = Application {
                owner: author("application", record.key.to_string(), record.owner_id)?,
                key: record.key,
                secret_key: record.secret_key,
                title: record.title,
                description: record.description,
                url: record.url,
                created_at: record.created_at,
            };
            let key = app.key.clone();
            if applications.insert(key.clone(), Arc::new(app)).is_some() {
                return Err(duplicate("application", key));
            }
        }

        debug!(
            users = users.len(),
            posts = posts.len(),
            applications = applications.len(),
            "store loaded"
        );
        Ok(Self {
            users,
            posts,
            posts_by_id,
            comments,
            applications,
        })
    }

    #[must_use]
    pub fn users_count(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn posts_count(&self) -> usize {
        self.posts.len()
    }

    #[must_use]
    pub fn post(&self, id: PostId) -> Option<Arc<Post>> {
        self.posts_by_id.get(&id).cloned()
    }

    /// One page of posts, sticky first, then newest first.
    #[must_use]
    pub fn posts(&self, offset: usize, limit: usize) -> Vec<Arc<Post>> {
        self.posts.iter().skip(offset).take(limit).cloned().collect()
    }

    /// The comment `id`, if it belongs to `post`.
    #[must_use]
    pub fn comment(&self, post: PostId, id: CommentId) -> Option<Arc<Comment>> {
        self.comments
            .get(&id)
            .filter(|c| c.post_id == post)
            .cloned()
    }
}

impl EntityStore for MemoryStore {
    fn application(&self, key: &ApplicationKey) -> Option<Arc<Application>> {
        self.applications.get(key).cloned()
    }

    fn user_by_login(&self, login: &str) -> Option<Arc<User>> {
        self.users.get(login).cloned()
    }

    fn users_by_email(&self, email: &str) -> Vec<Arc<User>> {
        let mut found: Vec<Arc<User>> = self
            .users
            .values()
            .filter(|u| u.email.as_deref() == Some(email))
            .cloned()
            .collect();
        found.sort_by_key(|u| u.id);
        found
    }
}

fn duplicate(kind: &'static str, id: impl ToString) -> StoreError {
    StoreError::Duplicate {
        kind,
        id: id.to_string(),
    }
}

fn build_users(seed: &Seed) -> StoreResult<HashMap<String, Arc<User>>> {
    let mut posts_count: HashMap<UserId, u64> = HashMap::new();
    for post in &seed.posts {
        *posts_count.entry(post.author_id).or_default() += 1;
    }
    let mut comments_count: HashMap<UserId, u64> = HashMap::new();
    for comment in &seed.comments {
        *comments_count.entry(comment.author_id).or_default() += 1;
    }

    let mut ids = HashSet::new();
    let mut users = HashMap::new();
    for record in &seed.users {
        if !ids.insert(record.id) {
            return Err(duplicate("user", record.id));
        }
        let login = validate_login(&record.login)?;
        let email = record.email.as_deref().map(validate_email).transpose()?;
        let user = User {
            id: record.id,
            login: login.clone(),
            name: record.name.clone(),
            email,
            url: record.url.clone(),
            password_hash: record.password_hash.clone(),
            created_at: record.created_at,
            posts_count: posts_count.get(&record.id).copied().unwrap_or_default(),
            comments_count: comments_count.get(&record.id).copied().unwrap_or_default(),
        };
        if users.insert(login.clone(), Arc::new(user)).is_some() {
            return Err(duplicate("user", login));
        }
    }
    Ok(users)
}

struct Threads {
    /// Top-level comments per post.
    roots: HashMap<PostId, Vec<Arc<Comment>>>,
    built: HashMap<CommentId, Arc<Comment>>,
}

fn build_threads<F>(seed: &Seed, author: &F) -> StoreResult<Threads>
where
    F: Fn(&'static str, String, UserId) -> StoreResult<Arc<User>>,
{
    let post_ids: HashSet<PostId> = seed.posts.iter().map(|p| p.id).collect();
    let mut records: HashMap<CommentId, &CommentRecord> = HashMap::new();
    for record in &seed.comments {
        if !post_ids.contains(&record.post_id) {
            return Err(StoreError::UnknownPost {
                comment: record.id,
                post: record.post_id,
            });
        }
        if records.insert(record.id, record).is_some() {
            return Err(duplicate("comment", record.id));
        }
    }

    let mut children: HashMap<Option<CommentId>, Vec<&CommentRecord>> = HashMap::new();
    let mut top_level: HashMap<PostId, Vec<&CommentRecord>> = HashMap::new();
    for record in &seed.comments {
        match record.parent_id {
            None => top_level.entry(record.post_id).or_default().push(record),
            Some(parent) => {
                let same_post = records
                    .get(&parent)
                    .is_some_and(|p| p.post_id == record.post_id);
                if !same_post {
                    return Err(StoreError::UnknownParent {
                        comment: record.id,
                        parent,
                    });
                }
                children.entry(Some(parent)).or_default().push(record);
            }
        }
    }

    let mut built = HashMap::new();
    let mut roots = HashMap::new();
    for (post, records) in top_level {
        let thread = build_replies(records, &children, author, &mut built)?;
        roots.insert(post, thread);
    }
    // Each comment has one parent, so a comment never reached from a
    // top-level comment sits on a cycle.
    if let Some(record) = seed.comments.iter().find(|c| !built.contains_key(&c.id)) {
        return Err(StoreError::ReplyCycle(record.id));
    }
    Ok(Threads { roots, built })
}

fn build_replies<F>(
    mut records: Vec<&CommentRecord>,
    children: &HashMap<Option<CommentId>, Vec<&CommentRecord>>,
    author: &F,
    built: &mut HashMap<CommentId, Arc<Comment>>,
) -> StoreResult<Vec<Arc<Comment>>>
where
    F: Fn(&'static str, String, UserId) -> StoreResult<Arc<User>>,
{
    records.sort_by_key(|r| (r.created_at, r.id));
    let mut thread = Vec::with_capacity(records.len());
    for record in records {
        let replies = match children.get(&Some(record.id)) {
            Some(replies) => build_replies(replies.clone(), children, author, built)?,
            None => Vec::new(),
        };
        let comment = Arc::new(Comment {
            id: record.id,
            post_id: record.post_id,
            post: None,
            parent: record.parent_id,
            author: author("comment", record.id.to_string(), record.author_id)?,
            body: record.body.clone(),
            created_at: record.created_at,
            replies,
        });
        built.insert(record.id, Arc::clone(&comment));
        thread.push(comment);
    }
    Ok(thread)
}
