//! Shared entity fixtures for web tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use langdev_model::{Application, ApplicationKey, Comment, CommentId, Post, PostId, User, UserId};
use langdev_web::EntityStore;
use std::sync::Arc;

pub const APP_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const APP_SECRET: &str = "s3cr3t";

pub fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2010, 8, day, 9, 0, 0).unwrap()
}

pub fn user(id: i64, login: &str, email: Option<&str>) -> Arc<User> {
    Arc::new(User {
        id: UserId::new(id),
        login: login.to_string(),
        name: login.to_uppercase(),
        email: email.map(str::to_string),
        url: None,
        password_hash: format!("hash-of-{login}"),
        created_at: at(1),
        posts_count: 1,
        comments_count: 2,
    })
}

pub fn alice() -> Arc<User> {
    user(1, "alice", Some("alice@example.com"))
}

pub fn bob() -> Arc<User> {
    user(2, "bob", Some("bob@example.com"))
}

pub fn comment(id: i64, author: Arc<User>, replies: Vec<Arc<Comment>>) -> Arc<Comment> {
    Arc::new(Comment {
        id: CommentId::new(id),
        post_id: PostId::new(10),
        post: None,
        parent: None,
        author,
        body: format!("comment {id}"),
        created_at: at(3),
        replies,
    })
}

/// A post by alice with one thread: bob's comment 1 and alice's reply 2.
pub fn post() -> Post {
    let reply = Arc::new(Comment {
        parent: Some(CommentId::new(1)),
        ..(*comment(2, alice(), vec![])).clone()
    });
    Post {
        id: PostId::new(10),
        author: alice(),
        title: "Hello".to_string(),
        body: "First post".to_string(),
        sticky: false,
        created_at: at(2),
        modified_at: at(4),
        replies: vec![comment(1, bob(), vec![reply])],
    }
}

pub fn application() -> Application {
    Application {
        key: ApplicationKey::from(APP_KEY),
        secret_key: APP_SECRET.to_string(),
        owner: alice(),
        title: "Reader".to_string(),
        description: "Reads the forum".to_string(),
        url: "https://reader.example.com/".to_string(),
        created_at: at(5),
    }
}

/// Holds alice, bob and [`application`].
#[derive(Default)]
pub struct FixtureStore {
    pub users: Vec<Arc<User>>,
    pub applications: Vec<Arc<Application>>,
}

impl FixtureStore {
    pub fn new() -> Self {
        Self {
            users: vec![alice(), bob()],
            applications: vec![Arc::new(application())],
        }
    }

    /// Adds carol, who registered with bob's email address.
    pub fn with_shared_email() -> Self {
        let mut store = Self::new();
        store.users.push(user(3, "carol", Some("bob@example.com")));
        store
    }
}

impl EntityStore for FixtureStore {
    fn application(&self, key: &ApplicationKey) -> Option<Arc<Application>> {
        self.applications.iter().find(|a| &a.key == key).cloned()
    }

    fn user_by_login(&self, login: &str) -> Option<Arc<User>> {
        self.users.iter().find(|u| u.login == login).cloned()
    }

    fn users_by_email(&self, email: &str) -> Vec<Arc<User>> {
        self.users
            .iter()
            .filter(|u| u.email.as_deref() == Some(email))
            .cloned()
            .collect()
    }
}
