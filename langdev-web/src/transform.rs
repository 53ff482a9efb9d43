//! Field shapes of the LangDev entities.
//!
//! Which fields a handler emits depends only on the entity, the viewer
//! and the `under_list` flag:
//! - a [`User`]'s email and an [`Application`]'s secret key are shown to
//!   their owner alone
//! - a [`Post`] or [`Comment`] inside a list omits its body (posts) or
//!   its post reference (comments), and its nested replies

use langdev_model::{Application, Comment, Post, User, UserId};
use langdev_simplify::{
    Mapping, Primitive, SimplifyOptions, SimplifyResult, Transform, Visitable, new_transform,
};
use std::sync::{Arc, OnceLock};

static TRANSFORM: OnceLock<Arc<Transform>> = OnceLock::new();

/// The process-wide entity transform, built on first use.
#[must_use]
pub fn transform() -> Arc<Transform> {
    Arc::clone(TRANSFORM.get_or_init(|| Arc::new(build_transform())))
}

/// Builds a fresh entity transform.
///
/// Exposed for callers that want to register extra handlers on top of
/// the entity ones.
#[must_use]
pub fn build_transform() -> Transform {
    let mut transform = new_transform("transform");
    transform
        .register(simplify_user)
        .register(simplify_post)
        .register(simplify_comment)
        .register(simplify_application);
    transform
}

/// Accumulates one entity's fields under the option's identifier map.
struct Fields<'o> {
    options: &'o SimplifyOptions,
    map: Mapping,
}

impl<'o> Fields<'o> {
    fn new(options: &'o SimplifyOptions) -> Self {
        Self {
            options,
            map: Mapping::new(),
        }
    }

    fn put(&mut self, label: &str, value: &dyn Visitable) -> SimplifyResult<()> {
        let value = self.options.simplify(value)?;
        self.map.insert(self.options.key(label), value);
        Ok(())
    }

    /// Simplifies `value` as a list element would be.
    fn put_summary(&mut self, label: &str, value: &dyn Visitable) -> SimplifyResult<()> {
        let value = self.options.nested().simplify(value)?;
        self.map.insert(self.options.key(label), value);
        Ok(())
    }

    fn finish(mut self, entity: &dyn Visitable) -> Primitive {
        if let Some(url) = self.options.url_for(entity) {
            self.map.insert(self.options.key("link"), Primitive::String(url));
        }
        Primitive::Mapping(self.map)
    }
}

fn viewer(options: &SimplifyOptions) -> Option<UserId> {
    options.viewer::<UserId>().copied()
}

fn simplify_user(user: &User, options: &SimplifyOptions) -> SimplifyResult<Primitive> {
    let mut fields = Fields::new(options);
    fields.put("ID", &user.id)?;
    fields.put("login", &user.login)?;
    fields.put("name", &user.name)?;
    fields.put("URL", &user.url)?;
    fields.put("created at", &user.created_at)?;
    fields.put("posts count", &user.posts_count)?;
    fields.put("comments count", &user.comments_count)?;
    if user.is_viewed_by(viewer(options)) {
        fields.put("email", &user.email)?;
    }
    Ok(fields.finish(user))
}

fn simplify_post(post: &Post, options: &SimplifyOptions) -> SimplifyResult<Primitive> {
    let mut fields = Fields::new(options);
    fields.put("ID", &post.id)?;
    fields.put("author", &post.author)?;
    fields.put("title", &post.title)?;
    fields.put("sticky", &post.sticky)?;
    fields.put("created at", &post.created_at)?;
    fields.put("modified at", &post.modified_at)?;
    fields.put("comments count", &post.comments_count())?;
    fields.put("replies count", &post.replies_count())?;
    if !options.under_list() {
        fields.put("body", &post.body)?;
        fields.put("replies", &post.replies)?;
    }
    Ok(fields.finish(post))
}

fn simplify_comment(comment: &Comment, options: &SimplifyOptions) -> SimplifyResult<Primitive> {
    let mut fields = Fields::new(options);
    fields.put("ID", &comment.id)?;
    fields.put("author", &comment.author)?;
    fields.put("body", &comment.body)?;
    fields.put("created at", &comment.created_at)?;
    fields.put("replies count", &comment.replies_count())?;
    if !options.under_list() {
        // The post is a reference back up the thread; never expand its replies.
        fields.put_summary("post", &comment.post)?;
        fields.put("replies", &comment.replies)?;
    }
    Ok(fields.finish(comment))
}

fn simplify_application(app: &Application, options: &SimplifyOptions) -> SimplifyResult<Primitive> {
    let mut fields = Fields::new(options);
    fields.put("key", &app.key)?;
    fields.put("owner", &app.owner)?;
    fields.put("title", &app.title)?;
    fields.put("description", &app.description)?;
    fields.put("URL", &app.url)?;
    fields.put("created at", &app.created_at)?;
    if app.is_owned_by(viewer(options)) {
        fields.put("secret key", &app.secret_key)?;
    }
    Ok(fields.finish(app))
}
