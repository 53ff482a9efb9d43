//! HTTP content negotiation over simplifier encoders and templates.
//!
//! A [`ContentNegotiator`] holds an ordered [`ContentTypeRegistry`]. For
//! each request it works out which media types are available for the
//! page (encoders always are, templates only when the file exists), picks
//! the best one for the `Accept` header and renders the page with it.
//!
//! A lone `*/*`, as sent by clients that do not negotiate, selects the
//! configured default type instead of whichever type happens to be
//! registered first.

use crate::error::{NegotiationError, NegotiationResult};
use crate::serializers::{Encode, JsonEncoder, PlistEncoder};
use crate::templates::TemplateRenderer;
use langdev_model::UserId;
use langdev_simplify::{Mapping, Primitive, Visitable};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// The header value sent back with every negotiated response.
pub const VARY: &str = "Accept";

const WILDCARD: &str = "*/*";

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub mime: String,
    pub quality: f32,
}

impl MediaRange {
    #[must_use]
    pub fn new(mime: impl Into<String>, quality: f32) -> Self {
        Self {
            mime: mime.into(),
            quality,
        }
    }

    /// True for `*/*`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.mime == WILDCARD
    }

    /// True if this range accepts `mime`.
    #[must_use]
    pub fn matches(&self, mime: &str) -> bool {
        self.is_wildcard() || self.mime.eq_ignore_ascii_case(mime)
    }
}

/// Parses an `Accept` header, highest quality first.
///
/// Media types are lowercased and parameters other than `q` are dropped.
/// Subtype wildcards such as `text/*` are kept here but never match an
/// available type during negotiation; only `*/*` does.
/// Entries with a `q` of zero are refused by the client and left out, as
/// are entries whose `q` is not a number between 0 and 1. Entries of equal
/// quality keep their header order.
#[must_use]
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header.split(',').filter_map(parse_range).collect();
    ranges.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    ranges
}

fn parse_range(entry: &str) -> Option<MediaRange> {
    let mut parts = entry.split(';');
    let mime = parts.next()?.trim().to_ascii_lowercase();
    if !mime.contains('/') {
        return None;
    }
    let mut quality = 1.0_f32;
    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("q") {
            quality = value.trim().parse().ok().filter(|q| (0.0..=1.0).contains(q))?;
        }
    }
    (quality > 0.0).then(|| MediaRange::new(mime, quality))
}

/// How a media type is produced.
#[derive(Clone)]
pub enum Target {
    /// A simplifier-backed encoder.
    Encoder(Arc<dyn Encode>),
    /// A template file suffix such as `".html"`, appended to the page's
    /// template name.
    Template(String),
}

impl Target {
    #[must_use]
    pub fn encoder(encoder: impl Encode + 'static) -> Self {
        Self::Encoder(Arc::new(encoder))
    }

    #[must_use]
    pub fn template(suffix: impl Into<String>) -> Self {
        Self::Template(suffix.into())
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoder(_) => f.write_str("Encoder"),
            Self::Template(suffix) => f.debug_tuple("Template").field(suffix).finish(),
        }
    }
}

/// Ordered media type → [`Target`] table.
///
/// Declaration order breaks quality ties during negotiation.
#[derive(Debug, Clone, Default)]
pub struct ContentTypeRegistry {
    entries: Vec<(String, Target)>,
}

impl ContentTypeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mime`. Re-registering keeps the original position.
    #[must_use]
    pub fn with(mut self, mime: impl Into<String>, target: Target) -> Self {
        let mime = mime.into().to_ascii_lowercase();
        match self.entries.iter_mut().find(|(m, _)| *m == mime) {
            Some(entry) => entry.1 = target,
            None => self.entries.push((mime, target)),
        }
        self
    }

    #[must_use]
    pub fn get(&self, mime: &str) -> Option<&Target> {
        self.entries
            .iter()
            .find(|(m, _)| m.eq_ignore_ascii_case(mime))
            .map(|(_, target)| target)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Target)> {
        self.entries.iter().map(|(m, t)| (m.as_str(), t))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// HTML and XML templates plus the JSON and plist encoders.
    #[must_use]
    pub fn standard() -> Self {
        Self::with_encoders(JsonEncoder::new(), PlistEncoder::new())
    }

    /// The standard table with custom encoders, e.g. ones that resolve
    /// URLs.
    #[must_use]
    pub fn with_encoders(json: JsonEncoder, plist: PlistEncoder) -> Self {
        let plist = Target::encoder(plist);
        Self::new()
            .with("text/html", Target::template(".html"))
            .with("application/xhtml+xml", Target::template(".html"))
            .with("text/xml", Target::template(".xml"))
            .with("application/json", Target::encoder(json))
            .with("application/plist+xml", plist.clone())
            .with("application/x-plist", plist)
    }
}

/// Negotiator settings fixed at start-up.
#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    /// Chosen when the client accepts nothing but `*/*`.
    pub default_content_type: String,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            default_content_type: "text/html".to_string(),
        }
    }
}

/// One renderable response: the value, its template and context.
pub struct Page<'a> {
    template: &'a str,
    value: &'a dyn Visitable,
    context: Mapping,
    viewer: Option<UserId>,
}

impl<'a> Page<'a> {
    /// `template` is the template name without suffix, e.g. `"forum/post"`.
    #[must_use]
    pub fn new(template: &'a str, value: &'a dyn Visitable) -> Self {
        Self {
            template,
            value,
            context: Mapping::new(),
            viewer: None,
        }
    }

    /// Adds a template context variable.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Primitive>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets the identity encoders simplify for. `None` is anonymous.
    #[must_use]
    pub fn viewer(mut self, viewer: Option<UserId>) -> Self {
        self.viewer = viewer;
        self
    }

    #[must_use]
    pub fn template(&self) -> &str {
        self.template
    }

    #[must_use]
    pub fn context(&self) -> &Mapping {
        &self.context
    }
}

/// A rendered response body and its headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: Vec<u8>,
    pub content_type: String,
    pub vary: &'static str,
}

/// Picks and runs the best encoder or template for a request.
pub struct ContentNegotiator {
    registry: ContentTypeRegistry,
    config: NegotiatorConfig,
    templates: Arc<dyn TemplateRenderer>,
}

impl ContentNegotiator {
    #[must_use]
    pub fn new(
        registry: ContentTypeRegistry,
        config: NegotiatorConfig,
        templates: Arc<dyn TemplateRenderer>,
    ) -> Self {
        Self {
            registry,
            config,
            templates,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ContentTypeRegistry {
        &self.registry
    }

    /// Media types that can be produced for `template`, in registry order.
    #[must_use]
    pub fn available(&self, template: &str) -> Vec<&str> {
        self.registry
            .iter()
            .filter(|(_, target)| match target {
                Target::Encoder(_) => true,
                Target::Template(suffix) => self.templates.exists(&format!("{template}{suffix}")),
            })
            .map(|(mime, _)| mime)
            .collect()
    }

    /// Chooses the media type for `template` given the request's `Accept`
    /// header. A missing or blank header accepts anything.
    pub fn negotiate(&self, template: &str, accept: Option<&str>) -> NegotiationResult<String> {
        let header = accept.map(str::trim).filter(|h| !h.is_empty()).unwrap_or(WILDCARD);
        let available = self.available(template);
        let mut ranges: Vec<MediaRange> = parse_accept(header)
            .into_iter()
            .filter(|range| range.is_wildcard() || available.contains(&range.mime.as_str()))
            .collect();
        if ranges.len() == 1 && ranges[0].is_wildcard() {
            ranges = vec![MediaRange::new(self.config.default_content_type.as_str(), 1.0)];
        }
        match best_match(&available, &ranges) {
            Some(mime) => {
                debug!(template, accept = header, mime, "negotiated");
                Ok(mime.to_string())
            }
            None => {
                warn!(template, accept = header, ?available, "not acceptable");
                Err(NegotiationError::NotAcceptable {
                    accept: header.to_string(),
                })
            }
        }
    }

    /// Negotiates and renders `page`.
    ///
    /// Encoders simplify the page's value for its viewer. Templates get the
    /// value itself and the page context.
    pub fn render(&self, accept: Option<&str>, page: &Page<'_>) -> NegotiationResult<Rendered> {
        let content_type = self.negotiate(page.template, accept)?;
        let body = match self.registry.get(&content_type) {
            Some(Target::Encoder(encoder)) => encoder.encode(page.value, page.viewer)?,
            Some(Target::Template(suffix)) => {
                let name = format!("{}{suffix}", page.template);
                self.templates
                    .render(&name, page.value, &page.context)?
                    .into_bytes()
            }
            None => {
                return Err(NegotiationError::NotAcceptable {
                    accept: content_type,
                });
            }
        };
        Ok(Rendered {
            body,
            content_type,
            vary: VARY,
        })
    }
}

impl fmt::Debug for ContentNegotiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentNegotiator")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Server types in order; a later type only wins with strictly higher
/// quality.
fn best_match<'a>(available: &[&'a str], ranges: &[MediaRange]) -> Option<&'a str> {
    let mut best: Option<(&'a str, f32)> = None;
    for &mime in available {
        for range in ranges {
            let beats = best.is_none_or(|(_, quality)| range.quality > quality);
            if beats && range.matches(mime) {
                best = Some((mime, range.quality));
            }
        }
    }
    best.map(|(mime, _)| mime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_qualities_and_sorts() {
        let ranges = parse_accept("text/html;q=0.5, application/json;q=0.9, */*");
        let mimes: Vec<&str> = ranges.iter().map(|r| r.mime.as_str()).collect();
        assert_eq!(mimes, vec!["*/*", "application/json", "text/html"]);
        assert_eq!(ranges[1].quality, 0.9);
    }

    #[test]
    fn drops_refused_and_malformed_entries() {
        let ranges = parse_accept("text/html;q=0, application/json;q=x, text/xml;q=2, foo, ");
        assert!(ranges.is_empty());
    }

    #[test]
    fn ignores_other_parameters_and_case() {
        let ranges = parse_accept("Text/HTML; charset=utf-8; level=1");
        assert_eq!(ranges, vec![MediaRange::new("text/html", 1.0)]);
    }

    #[test]
    fn only_the_full_wildcard_matches_everything() {
        assert!(MediaRange::new("*/*", 1.0).matches("text/html"));
        assert!(!MediaRange::new("text/*", 1.0).matches("text/html"));
    }

    #[test]
    fn ties_go_to_registry_order() {
        let ranges = parse_accept("application/json, text/html");
        assert_eq!(
            best_match(&["text/html", "application/json"], &ranges),
            Some("text/html")
        );
    }
}
