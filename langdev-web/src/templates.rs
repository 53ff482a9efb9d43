//! Boundary to the HTML template layer.
//!
//! Templates receive the original value, not its simplified tree, together
//! with a small context mapping.

use crate::error::{RenderError, RenderResult};
use langdev_simplify::{Mapping, Visitable};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Renders named templates.
pub trait TemplateRenderer: Send + Sync {
    /// Returns true if a template called `name` exists.
    fn exists(&self, name: &str) -> bool;

    /// Renders template `name` with `value` and `context`.
    fn render(&self, name: &str, value: &dyn Visitable, context: &Mapping) -> RenderResult<String>;
}

type TemplateFn = Arc<dyn Fn(&dyn Visitable, &Mapping) -> RenderResult<String> + Send + Sync>;

/// In-memory templates keyed by full name (`"user/profile.html"`).
#[derive(Clone, Default)]
pub struct TemplateSet {
    templates: HashMap<String, TemplateFn>,
}

impl TemplateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces template `name`.
    pub fn insert<F>(&mut self, name: impl Into<String>, template: F) -> &mut Self
    where
        F: Fn(&dyn Visitable, &Mapping) -> RenderResult<String> + Send + Sync + 'static,
    {
        self.templates.insert(name.into(), Arc::new(template));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateRenderer for TemplateSet {
    fn exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn render(&self, name: &str, value: &dyn Visitable, context: &Mapping) -> RenderResult<String> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;
        template(value, context)
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TemplateSet").field("templates", &names).finish()
    }
}
