//! Component types and the render-time node for one tag invocation

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::engine::config::DEFAULT_MAX_DEPTH;
use crate::engine::{Context, Engine, NodeList, Template, TemplateCacheKey};
use crate::error::{ConfigError, RenderError};
use crate::parser::ast::Expr;
use crate::value::Value;

use super::attribute::{AttributeSpec, RenderMode};
use super::context::ComponentContext;
use super::media::Media;
use super::parser::ComponentArgs;
use super::slot::{SlotKey, SlotNode};

/// Where a component's template comes from
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSource {
    /// Template source held by the component type
    Inline(String),
    /// Candidate names; the first one the engine can load is used
    Named(Vec<String>),
}

/// Identity of one built [`ComponentType`]
///
/// Two types built separately never share an id, even when their names match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(usize);

impl ComponentId {
    fn next() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reusable component: attribute declarations, template and assets
///
/// Built once with [`ComponentType::builder`] and shared read-only between
/// every invocation of its tag.
#[derive(Debug)]
pub struct ComponentType {
    id: ComponentId,
    name: String,
    template: Option<TemplateSource>,
    attributes: Vec<(String, AttributeSpec)>,
    media: Media,
    isolated: bool,
}

impl ComponentType {
    pub fn builder(name: impl Into<String>) -> ComponentTypeBuilder {
        ComponentTypeBuilder::new(name)
    }

    pub(crate) fn slot() -> Self {
        Self {
            id: ComponentId::next(),
            name: "slot".to_string(),
            template: Some(TemplateSource::Inline("{{ content }}".to_string())),
            attributes: Vec::new(),
            media: Media::new(),
            isolated: false,
        }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> Option<&TemplateSource> {
        self.template.as_ref()
    }

    /// Declared attributes in declaration order, keyed by field
    pub fn attributes(&self) -> &[(String, AttributeSpec)] {
        &self.attributes
    }

    pub fn attribute(&self, field: &str) -> Option<&AttributeSpec> {
        self.attributes
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, spec)| spec)
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn is_isolated(&self) -> bool {
        self.isolated
    }
}

pub struct ComponentTypeBuilder {
    name: String,
    template: Option<TemplateSource>,
    attributes: Vec<(String, AttributeSpec)>,
    media: Media,
    isolated: bool,
}

impl ComponentTypeBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            template: None,
            attributes: Vec::new(),
            media: Media::new(),
            isolated: true,
        }
    }

    pub fn template_name(self, name: impl Into<String>) -> Self {
        self.template_names([name])
    }

    pub fn template_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.template = Some(TemplateSource::Named(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn inline_template(mut self, source: impl Into<String>) -> Self {
        self.template = Some(TemplateSource::Inline(source.into()));
        self
    }

    /// Declare an attribute; order of declaration is the order of resolution
    pub fn attribute(mut self, field: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.push((field.into(), spec));
        self
    }

    pub fn media(mut self, media: Media) -> Self {
        self.media = media;
        self
    }

    /// Whether the template sees only its own variables (default) or the caller's too
    pub fn isolated(mut self, isolated: bool) -> Self {
        self.isolated = isolated;
        self
    }

    pub fn build(self) -> Result<ComponentType, ConfigError> {
        let valid_name = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(ConfigError::invalid(format!(
                "'{}' is not a valid component name",
                self.name
            )));
        }
        if let Some(TemplateSource::Named(names)) = &self.template {
            if names.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "component '{}' lists no template names",
                    self.name
                )));
            }
        }

        let mut seen = IndexMap::new();
        for (field, spec) in &self.attributes {
            spec.bind_name(field);
            spec.validate()?;
            if seen.insert(field.as_str(), ()).is_some() {
                return Err(ConfigError::invalid(format!(
                    "component '{}' declares attribute '{}' twice",
                    self.name, field
                )));
            }
        }

        Ok(ComponentType {
            id: ComponentId::next(),
            name: self.name,
            template: self.template,
            attributes: self.attributes,
            media: self.media,
            isolated: self.isolated,
        })
    }
}

/// One invocation of a component tag
#[derive(Debug)]
pub struct ComponentNode {
    component: Arc<ComponentType>,
    args: ComponentArgs,
    isolated: bool,
}

impl ComponentNode {
    pub fn new(component: Arc<ComponentType>, args: ComponentArgs) -> Self {
        let isolated = component.is_isolated();
        Self {
            component,
            args,
            isolated,
        }
    }

    /// Override the component type's isolation for this invocation
    pub fn with_isolation(mut self, isolated: bool) -> Self {
        self.isolated = isolated;
        self
    }

    pub fn component(&self) -> &ComponentType {
        &self.component
    }

    pub fn tag_name(&self) -> &str {
        &self.args.tag_name
    }

    pub fn body(&self) -> &NodeList {
        &self.args.body
    }

    pub fn args(&self) -> &ComponentArgs {
        &self.args
    }

    pub fn slots(&self) -> &IndexMap<SlotKey, SlotNode> {
        &self.args.slots
    }

    pub fn render(&self, ctx: &mut Context) -> Result<String, RenderError> {
        let limit = ctx
            .engine()
            .map_or(DEFAULT_MAX_DEPTH, |e| e.config().max_depth);
        let level = ctx.enter_component();
        let result = if level > limit {
            Err(RenderError::RecursionLimit {
                component: self.component.name().to_string(),
                limit,
            })
        } else {
            self.render_at_level(ctx)
        };
        ctx.leave_component();
        result
    }

    fn render_at_level(&self, ctx: &mut Context) -> Result<String, RenderError> {
        tracing::debug!(
            component = self.component.name(),
            tag = self.tag_name(),
            isolated = self.isolated,
            "rendering component"
        );
        let template = self.template(ctx)?;
        let mut composed = self.compose(ctx)?;
        template.render(&mut composed)
    }

    fn template(&self, ctx: &Context) -> Result<Arc<Template>, RenderError> {
        let source = self
            .component
            .template()
            .ok_or_else(|| RenderError::TemplateUndefined {
                component: self.component.name().to_string(),
            })?;
        let names = match source {
            TemplateSource::Inline(_) => Vec::new(),
            TemplateSource::Named(names) => names.clone(),
        };
        let key: TemplateCacheKey = (self.component.id(), names);
        if let Some(template) = ctx.cached_template(&key) {
            tracing::trace!(component = self.component.name(), "template cache hit");
            return Ok(template);
        }

        let engine = match ctx.engine() {
            Some(engine) => engine,
            None => {
                let engine = Arc::new(Engine::new());
                ctx.bind_engine(&engine);
                engine
            }
        };
        let template = match source {
            TemplateSource::Inline(text) => engine.inline_template(&self.component, text)?,
            TemplateSource::Named(names) => engine.select_template(names.as_slice())?,
        };
        tracing::trace!(component = self.component.name(), "template cache miss");
        ctx.cache_template(key, Arc::clone(&template));
        Ok(template)
    }

    /// Resolve attributes and options into a finalized context with slots injected
    fn compose(&self, ctx: &Context) -> Result<Context, RenderError> {
        let mut scope = ComponentContext::new(ctx, self.isolated).with_body(&self.args.body);
        let mut remaining: IndexMap<&str, &Expr> = self
            .args
            .kwargs
            .iter()
            .map(|(key, expr)| (key.as_str(), expr))
            .collect();

        for (field, spec) in self.component.attributes() {
            let value = match remaining.shift_remove(field.as_str()) {
                Some(raw) => spec.resolve_or_default(raw, ctx)?,
                None => spec.resolve_default()?,
            };
            tracing::trace!(
                attribute = spec.name(),
                mode = ?spec.mode(),
                value = %value,
                "resolved attribute"
            );
            match spec.mode() {
                RenderMode::Context => scope.set(spec.name(), value)?,
                RenderMode::Class => scope.add_class([value])?,
                RenderMode::Attribute => scope.add_attribute(spec.name(), value)?,
            }
        }
        for (name, raw) in remaining {
            scope.add_attribute(name, raw)?;
        }

        for (name, raw) in &self.args.options {
            let value = raw.resolve(ctx)?;
            scope.set(name.as_str(), value)?;
        }

        if !self.component.media().is_empty() {
            tracing::trace!(component = self.component.name(), "contributing media");
            ctx.add_media(self.component.media());
        }
        scope.make()?;

        let mut rendered_slots = Vec::with_capacity(self.args.slots.len());
        if !self.args.slots.is_empty() {
            let mut view = scope.render_view();
            for (key, slot) in &self.args.slots {
                rendered_slots.push((key.context_key(), slot.render(&mut view)?));
            }
        }

        let mut composed = scope.into_context();
        for (key, rendered) in rendered_slots {
            composed.set(key, Value::Safe(rendered));
        }
        Ok(composed)
    }
}
