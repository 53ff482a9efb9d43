//! HTTP surface for LangDev.
//!
//! Serves users, forum posts, comments, third-party applications and the
//! SSO endpoint from a [`MemoryStore`]. Every page is content-negotiated:
//! browsers get HTML, API clients JSON or property lists. Requests are
//! anonymous.

mod pages;
mod store;

pub use pages::{negotiator, templates, url_resolver};
pub use store::{MemoryStore, StoreError, StoreResult};

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use langdev_model::{ApplicationKey, CommentId, PostId};
use langdev_web::{ContentNegotiator, EntityStore, NegotiationError, Page, SsoRequest, authenticate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

/// Posts per page when the request sets no limit.
pub const DEFAULT_LIMIT: usize = 20;

/// Shared, read-only request state.
#[derive(Clone)]
pub struct AppState {
    store: Arc<MemoryStore>,
    negotiator: Arc<ContentNegotiator>,
}

impl AppState {
    /// Serves `store` with the built-in pages.
    #[must_use]
    pub fn new(store: MemoryStore) -> Self {
        Self::with_negotiator(store, negotiator())
    }

    #[must_use]
    pub fn with_negotiator(store: MemoryStore, negotiator: ContentNegotiator) -> Self {
        Self {
            store: Arc::new(store),
            negotiator: Arc::new(negotiator),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PostsQuery {
    offset: Option<usize>,
    limit: Option<usize>,
}

/// `password`, `with=userinfo` and `error=ignore`, from the query string
/// or a form body.
#[derive(Debug, Deserialize)]
struct SsoParams {
    password: Option<String>,
    with: Option<String>,
    error: Option<String>,
}

/// Build the HTTP router over the given state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/users/{login}", get(user_profile))
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(show_post))
        .route("/posts/{id}/comments/{comment_id}", get(show_comment))
        .route("/apps/{key}", get(show_application))
        .route("/apps/{key}/sso/{login}", get(sso_query).post(sso_form))
        .with_state(state)
}

/// Negotiates and renders `page`, attaching `Vary: Accept`.
fn respond(state: &AppState, headers: &HeaderMap, page: &Page<'_>) -> Response {
    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok());
    match state.negotiator.render(accept, page) {
        Ok(rendered) => (
            [
                (header::CONTENT_TYPE, rendered.content_type),
                (header::VARY, rendered.vary.to_string()),
            ],
            rendered.body,
        )
            .into_response(),
        Err(NegotiationError::NotAcceptable { .. }) => (
            StatusCode::NOT_ACCEPTABLE,
            [(header::VARY, langdev_web::negotiation::VARY)],
        )
            .into_response(),
        Err(NegotiationError::Render(err)) => {
            error!(template = page.template(), %err, "render failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn user_profile(
    State(state): State<AppState>,
    Path(login): Path<String>,
    headers: HeaderMap,
) -> Response {
    match state.store.user_by_login(&login) {
        Some(user) => respond(&state, &headers, &Page::new("user/profile", &*user)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
    headers: HeaderMap,
) -> Response {
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).max(1);
    let posts = state.store.posts(offset, limit);
    let page = Page::new("forum/posts", &posts)
        .with("offset", offset as u64)
        .with("limit", limit as u64)
        .with("count", state.store.posts_count() as u64);
    respond(&state, &headers, &page)
}

async fn show_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    match state.store.post(PostId::new(id)) {
        Some(post) => respond(&state, &headers, &Page::new("forum/post", &*post)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn show_comment(
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    headers: HeaderMap,
) -> Response {
    match state
        .store
        .comment(PostId::new(post_id), CommentId::new(comment_id))
    {
        Some(comment) => respond(&state, &headers, &Page::new("forum/comment", &*comment)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn show_application(
    State(state): State<AppState>,
    Path(key): Path<String>,
    headers: HeaderMap,
) -> Response {
    match state.store.application(&ApplicationKey::from(key)) {
        Some(app) => respond(&state, &headers, &Page::new("thirdparty/app", &*app)),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn sso_query(
    State(state): State<AppState>,
    Path((key, login)): Path<(String, String)>,
    headers: HeaderMap,
    Query(params): Query<SsoParams>,
) -> Response {
    sso(&state, key, login, &headers, params)
}

async fn sso_form(
    State(state): State<AppState>,
    Path((key, login)): Path<(String, String)>,
    headers: HeaderMap,
    Form(params): Form<SsoParams>,
) -> Response {
    sso(&state, key, login, &headers, params)
}

fn sso(
    state: &AppState,
    key: String,
    login: String,
    headers: &HeaderMap,
    params: SsoParams,
) -> Response {
    let Some(password) = params.password else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let request = SsoRequest::new(login, password)
        .with_userinfo(params.with.as_deref() == Some("userinfo"))
        .ignore_errors(params.error.as_deref() == Some("ignore"));
    match authenticate(state.store.as_ref(), &ApplicationKey::from(key), &request) {
        Ok(outcome) => respond(state, headers, &outcome.page()),
        Err(err) => {
            info!(%err, "SSO request rejected");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}
