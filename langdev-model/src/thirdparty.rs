//! Third-party applications and the single sign-on digest.
//!
//! A registered application receives a public [`ApplicationKey`] and a
//! secret key. To check a member's credentials it computes
//! `HMAC-SHA1(secret_key, password_hash)` and submits the hex digest; the
//! server recomputes the digest over the stored hash and compares. The
//! password itself never leaves the server.

use crate::{ApplicationKey, User, UserId};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;
use std::sync::Arc;

type HmacSha1 = Hmac<Sha1>;

/// Size of an SSO digest in bytes.
pub const DIGEST_SIZE: usize = 20;

/// Size of a generated secret key in bytes (64 hex characters).
const SECRET_KEY_BYTES: usize = 32;

/// Computes the raw SSO digest of `message` under `secret`.
#[must_use]
pub fn sso_digest(secret: &[u8], message: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut mac = new_mac(secret);
    mac.update(message);
    let mut digest = [0u8; DIGEST_SIZE];
    digest.copy_from_slice(&mac.finalize().into_bytes());
    digest
}

fn new_mac(secret: &[u8]) -> HmacSha1 {
    HmacSha1::new_from_slice(secret).expect("HMAC accepts keys of any length")
}

/// A registered third-party application.
#[derive(Debug, Clone, PartialEq)]
pub struct Application {
    pub key: ApplicationKey,
    pub secret_key: String,
    pub owner: Arc<User>,
    pub title: String,
    pub description: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl Application {
    /// Generates a random public key.
    #[must_use]
    pub fn generate_key() -> ApplicationKey {
        ApplicationKey::generate()
    }

    /// Generates a random secret key of 64 hexadecimal characters.
    #[must_use]
    pub fn generate_secret_key() -> String {
        let mut bytes = [0u8; SECRET_KEY_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Hashes `message` with this application's secret key.
    ///
    /// Returns the lowercase hex digest.
    #[must_use]
    pub fn hmac(&self, message: &str) -> String {
        hex::encode(sso_digest(self.secret_key.as_bytes(), message.as_bytes()))
    }

    /// Checks a submitted hex digest of `message` in constant time.
    ///
    /// Malformed hex never verifies.
    #[must_use]
    pub fn verify(&self, message: &str, digest: &str) -> bool {
        let Ok(submitted) = hex::decode(digest.trim()) else {
            return false;
        };
        let mut mac = new_mac(self.secret_key.as_bytes());
        mac.update(message.as_bytes());
        mac.verify_slice(&submitted).is_ok()
    }

    /// Returns true when `viewer` owns this application.
    #[must_use]
    pub fn is_owned_by(&self, viewer: Option<UserId>) -> bool {
        viewer == Some(self.owner.id)
    }
}
