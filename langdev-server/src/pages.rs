//! Built-in HTML pages and entity URLs.

use langdev_model::{Application, Comment, Post, User};
use langdev_simplify::{Mapping, UrlResolver, Visitable};
use langdev_web::{
    ContentNegotiator, ContentTypeRegistry, JsonEncoder, NegotiatorConfig, PlistEncoder,
    RenderError, RenderResult, TemplateSet,
};
use std::any::Any;
use std::fmt::Write;
use std::sync::Arc;

/// The negotiator serving every page: the standard content types, with
/// entity links, over the built-in templates.
#[must_use]
pub fn negotiator() -> ContentNegotiator {
    let resolver = url_resolver();
    let registry = ContentTypeRegistry::with_encoders(
        JsonEncoder::new().with_url_resolver(Arc::clone(&resolver)),
        PlistEncoder::new().with_url_resolver(resolver),
    );
    ContentNegotiator::new(registry, NegotiatorConfig::default(), Arc::new(templates()))
}

/// Public path of users, posts and applications.
#[must_use]
pub fn url_resolver() -> UrlResolver {
    Arc::new(|value: &dyn Visitable| {
        let value = value.as_any();
        if let Some(user) = value.downcast_ref::<User>() {
            Some(format!("/users/{}", user.login))
        } else if let Some(post) = value.downcast_ref::<Post>() {
            Some(format!("/posts/{}", post.id))
        } else if let Some(comment) = value.downcast_ref::<Comment>() {
            Some(format!("/posts/{}/comments/{}", comment.post_id, comment.id))
        } else {
            value
                .downcast_ref::<Application>()
                .map(|app| format!("/apps/{}", app.key))
        }
    })
}

/// Minimal HTML templates for every page the router serves.
#[must_use]
pub fn templates() -> TemplateSet {
    let mut templates = TemplateSet::new();
    templates
        .insert("user/profile.html", |value: &dyn Visitable, _: &Mapping| {
            let user: &User = expect("user/profile.html", value)?;
            Ok(page(
                &user.name,
                &format!("<p>{} joined {}</p>", escape(&user.login), user.created_at.date_naive()),
            ))
        })
        .insert("forum/posts.html", |value: &dyn Visitable, _: &Mapping| {
            let posts: &Vec<Arc<Post>> = expect("forum/posts.html", value)?;
            let mut body = String::from("<ul>");
            for post in posts {
                let _ = write!(
                    body,
                    r#"<li><a href="/posts/{}">{}</a></li>"#,
                    post.id,
                    escape(&post.title)
                );
            }
            body.push_str("</ul>");
            Ok(page("Forum", &body))
        })
        .insert("forum/post.html", |value: &dyn Visitable, _: &Mapping| {
            let post: &Post = expect("forum/post.html", value)?;
            Ok(page(&post.title, &format!("<p>{}</p>", escape(&post.body))))
        })
        .insert("forum/comment.html", |value: &dyn Visitable, _: &Mapping| {
            let comment: &Comment = expect("forum/comment.html", value)?;
            Ok(page(
                &comment.author.name,
                &format!("<p>{}</p>", escape(&comment.body)),
            ))
        })
        .insert("thirdparty/app.html", |value: &dyn Visitable, _: &Mapping| {
            let app: &Application = expect("thirdparty/app.html", value)?;
            Ok(page(
                &app.title,
                &format!(
                    "<p>{}</p><p>by {}</p>",
                    escape(&app.description),
                    escape(&app.owner.name)
                ),
            ))
        })
        .insert("thirdparty/sso.html", |_: &dyn Visitable, context: &Mapping| {
            let success = context
                .get("success")
                .and_then(|s| s.as_bool())
                .unwrap_or(false);
            Ok(page("SSO", &format!("<p>{success}</p>")))
        });
    templates
}

fn expect<'v, T: Any>(name: &str, value: &'v dyn Visitable) -> RenderResult<&'v T> {
    value
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| RenderError::Template {
            name: name.to_string(),
            reason: format!("expected a {}", std::any::type_name::<T>()),
        })
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>{}</title></head><body>{body}</body></html>\n",
        escape(title)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
