//! Users and login/email validation.

use crate::{ModelError, ModelResult, UserId};
use chrono::{DateTime, Utc};
use regex_lite::Regex;
use std::sync::OnceLock;

/// Characters allowed in a login name: ASCII lowercase letters, digits,
/// `-`, `_`, `.` and the Hangul jamo/syllable blocks.
const LOGIN_PATTERN: &str = "^[-_.a-z0-9\
    \u{1100}-\u{11ff}\u{3131}-\u{318e}\u{3200}-\u{321e}\u{3260}-\u{327e}\
    \u{a960}-\u{a97c}\u{ac00}-\u{d7a3}\u{d7b0}-\u{d7c6}\u{d7cb}-\u{d7fb}\
    \u{ffa0}-\u{ffbe}\u{ffc2}-\u{ffc7}\u{ffca}-\u{ffcf}\u{ffd2}-\u{ffd7}\
    \u{ffda}-\u{ffdc}]{2,45}$";

const EMAIL_PATTERN: &str = r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$";

static LOGIN_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn login_re() -> &'static Regex {
    LOGIN_RE.get_or_init(|| Regex::new(LOGIN_PATTERN).expect("login pattern is valid"))
}

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is valid"))
}

/// Returns true if `login` is already a well-formed login name.
///
/// Unlike [`validate_login`] this does not trim or lowercase first.
#[must_use]
pub fn is_login(login: &str) -> bool {
    login_re().is_match(login)
}

/// Normalizes (trim + lowercase) and validates a login name.
pub fn validate_login(login: &str) -> ModelResult<String> {
    let normalized = login.trim().to_lowercase();
    if is_login(&normalized) {
        Ok(normalized)
    } else {
        Err(ModelError::InvalidLogin(normalized))
    }
}

/// Trims and validates an email address.
pub fn validate_email(email: &str) -> ModelResult<String> {
    let trimmed = email.trim();
    if email_re().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ModelError::InvalidEmail(trimmed.to_string()))
    }
}

/// A registered LangDev member.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub login: String,
    /// Screen name.
    pub name: String,
    pub email: Option<String>,
    /// Personal website.
    pub url: Option<String>,
    /// Stored password digest. Hashing policy belongs to the auth layer.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub posts_count: u64,
    pub comments_count: u64,
}

impl User {
    /// Returns true when `viewer` is this very user.
    #[must_use]
    pub fn is_viewed_by(&self, viewer: Option<UserId>) -> bool {
        viewer == Some(self.id)
    }
}
