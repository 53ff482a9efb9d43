//! Shared seed fixture for server tests.

#![allow(dead_code)]

use langdev_model::sso_digest;
use langdev_server::{AppState, MemoryStore, build_router};
use std::io::Write;
use tempfile::NamedTempFile;

pub const APP_KEY: &str = "0123456789abcdef0123456789abcdef";
pub const APP_SECRET: &str = "s3cr3t";
pub const DAHLIA_HASH: &str = "5f4dcc3b5aa765d61d8327deb882cf99";

pub const SEED: &str = r#"{
  "users": [
    {"id": 1, "login": "dahlia", "name": "Hong Minhee", "email": "dahlia@example.com",
     "password_hash": "5f4dcc3b5aa765d61d8327deb882cf99", "created_at": "2010-08-01T09:00:00Z"},
    {"id": 2, "login": "minhee", "name": "Minhee", "email": "minhee@example.com",
     "url": "https://minhee.example.com/",
     "password_hash": "e99a18c428cb38d5f260853678922e03", "created_at": "2010-08-01T10:00:00Z"}
  ],
  "posts": [
    {"id": 1, "author_id": 1, "title": "Welcome", "body": "First <b>post</b>",
     "created_at": "2010-08-02T09:00:00Z", "modified_at": "2010-08-03T09:00:00Z"},
    {"id": 2, "author_id": 2, "title": "Notice", "body": "Read me", "sticky": true,
     "created_at": "2010-08-01T12:00:00Z"},
    {"id": 3, "author_id": 1, "title": "Later", "body": "Newest",
     "created_at": "2010-08-05T09:00:00Z"}
  ],
  "comments": [
    {"id": 1, "post_id": 1, "author_id": 2, "body": "Nice", "created_at": "2010-08-02T10:00:00Z"},
    {"id": 2, "post_id": 1, "parent_id": 1, "author_id": 1, "body": "Thanks",
     "created_at": "2010-08-02T11:00:00Z"}
  ],
  "applications": [
    {"key": "0123456789abcdef0123456789abcdef", "secret_key": "s3cr3t", "owner_id": 1,
     "title": "Reader", "description": "Reads the forum", "url": "https://reader.example.com/",
     "created_at": "2010-08-04T09:00:00Z"}
  ]
}"#;

/// Writes `SEED` to a temporary file, as the binary would read it.
pub fn seed_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SEED.as_bytes()).unwrap();
    file
}

pub fn store() -> MemoryStore {
    let file = seed_file();
    MemoryStore::load(file.path()).unwrap()
}

/// The digest a third party submits for a member with `password_hash`.
pub fn digest(password_hash: &str) -> String {
    hex::encode(sso_digest(APP_SECRET.as_bytes(), password_hash.as_bytes()))
}

/// Spin up the HTTP server on an OS-assigned port, returning the base URL.
pub async fn spawn_test_server() -> String {
    let app = build_router(AppState::new(store()));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}
