//! Single sign-on delegation for third-party applications.
//!
//! An application submits a member's login name (or email address) and
//! `HMAC-SHA1(secret_key, password_hash)` as the password. The digest is
//! recomputed over the stored hash and compared; the password itself
//! never leaves LangDev.
//!
//! With `with=userinfo`, a successful check answers with the member's
//! profile, simplified as if the member were the viewer. This is the only
//! response in which a member's email reaches a third party.

use crate::error::SsoError;
use crate::negotiation::Page;
use langdev_model::{Application, ApplicationKey, User, UserId, is_login};
use std::sync::Arc;
use tracing::{debug, info};

/// Template rendered for SSO responses.
pub const SSO_TEMPLATE: &str = "thirdparty/sso";

/// Read access to the entities the endpoint needs.
pub trait EntityStore: Send + Sync {
    fn application(&self, key: &ApplicationKey) -> Option<Arc<Application>>;

    fn user_by_login(&self, login: &str) -> Option<Arc<User>>;

    /// Every member registered with `email`. Addresses are not unique.
    fn users_by_email(&self, email: &str) -> Vec<Arc<User>>;
}

/// One SSO request, as submitted by the third party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoRequest {
    /// A login name or an email address.
    pub login: String,
    /// Hex `HMAC-SHA1(secret_key, password_hash)`.
    pub password: String,
    /// `with=userinfo`: answer with the profile on success.
    pub with_userinfo: bool,
    /// `error=ignore`: answer unknown members with a plain denial.
    pub ignore_errors: bool,
}

impl SsoRequest {
    #[must_use]
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
            with_userinfo: false,
            ignore_errors: false,
        }
    }

    #[must_use]
    pub fn with_userinfo(mut self, with_userinfo: bool) -> Self {
        self.with_userinfo = with_userinfo;
        self
    }

    #[must_use]
    pub fn ignore_errors(mut self, ignore_errors: bool) -> Self {
        self.ignore_errors = ignore_errors;
        self
    }
}

/// Result of a delegated authentication.
#[derive(Debug, Clone, PartialEq)]
pub enum SsoOutcome {
    Denied,
    Authenticated,
    /// Authenticated, answered with the member's profile.
    Profile(Arc<User>),
}

impl SsoOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        !matches!(self, Self::Denied)
    }

    /// The viewer the response is simplified for.
    #[must_use]
    pub fn viewer(&self) -> Option<UserId> {
        match self {
            Self::Profile(user) => Some(user.id),
            _ => None,
        }
    }

    /// The page to negotiate: the profile, or the bare success flag.
    #[must_use]
    pub fn page(&self) -> Page<'_> {
        let page = match self {
            Self::Profile(user) => Page::new(SSO_TEMPLATE, user),
            Self::Authenticated => Page::new(SSO_TEMPLATE, &true),
            Self::Denied => Page::new(SSO_TEMPLATE, &false),
        };
        page.with("success", self.success()).viewer(self.viewer())
    }
}

/// Checks `request` against the application registered under `key`.
pub fn authenticate(
    store: &dyn EntityStore,
    key: &ApplicationKey,
    request: &SsoRequest,
) -> Result<SsoOutcome, SsoError> {
    let app = store
        .application(key)
        .ok_or_else(|| SsoError::ApplicationNotFound(key.clone()))?;
    let Some(user) = find_user(store, request)? else {
        info!(app = %key, login = %request.login, "SSO denied: unknown user");
        return Ok(SsoOutcome::Denied);
    };
    if !app.verify(&user.password_hash, &request.password) {
        info!(app = %key, user = %user.id, "SSO denied: digest mismatch");
        return Ok(SsoOutcome::Denied);
    }
    info!(app = %key, user = %user.id, userinfo = request.with_userinfo, "SSO authenticated");
    Ok(if request.with_userinfo {
        SsoOutcome::Profile(user)
    } else {
        SsoOutcome::Authenticated
    })
}

/// `Ok(None)` denies without an error.
fn find_user(store: &dyn EntityStore, request: &SsoRequest) -> Result<Option<Arc<User>>, SsoError> {
    let not_found = || {
        if request.ignore_errors {
            Ok(None)
        } else {
            Err(SsoError::UserNotFound(request.login.clone()))
        }
    };
    if is_login(&request.login) {
        debug!(login = %request.login, "SSO lookup by login");
        return match store.user_by_login(&request.login) {
            Some(user) => Ok(Some(user)),
            None => not_found(),
        };
    }
    debug!(email = %request.login, "SSO lookup by email");
    let mut users = store.users_by_email(&request.login);
    match users.len() {
        0 => not_found(),
        1 => Ok(users.pop()),
        count => {
            debug!(count, "SSO email is ambiguous");
            Ok(None)
        }
    }
}
