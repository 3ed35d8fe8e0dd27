//! Template engine: compiled templates, loaders and the tag library
//!
//! An [`Engine`] owns the configuration, the tag [`Library`] and the loaders.
//! Named templates are compiled once and cached for the life of the engine;
//! a [`Context`] records which engine renders it so that nested components can
//! load their own templates.

pub mod config;
mod context;
pub mod escape;
mod library;
mod loader;
mod node;

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

pub use config::EngineConfig;
pub use context::{Context, Lookup, RenderState, TemplateCacheKey};
pub use library::{tag_parser, wrap_as_tag, Library, RegisteredTag, TagParser, TagRegistration};
pub use loader::{FileSystemLoader, MemoryLoader, TemplateLoader};
pub use node::{Node, NodeList, TagNode};

use crate::component::ComponentType;
use crate::error::{ConfigError, ParseError, RenderError};
use crate::parser::TemplateParser;

/// A compiled template
#[derive(Debug)]
pub struct Template {
    name: Option<String>,
    nodes: NodeList,
}

impl Template {
    pub fn new(name: Option<String>, nodes: NodeList) -> Self {
        Self { name, nodes }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn nodes(&self) -> &NodeList {
        &self.nodes
    }

    pub fn render(&self, ctx: &mut Context) -> Result<String, RenderError> {
        self.nodes.render(ctx)
    }
}

/// Template engine
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    library: Library,
    loaders: Vec<Box<dyn TemplateLoader>>,
    cache: RwLock<HashMap<String, Arc<Template>>>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with default configuration and the builtin tags
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            library: Library::with_builtins(),
            loaders: Vec::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Create an engine with a filesystem loader for every configured directory
    pub fn from_config(config: EngineConfig) -> Self {
        let loaders = config
            .dirs
            .iter()
            .map(|dir| Box::new(FileSystemLoader::new(dir.clone())) as Box<dyn TemplateLoader>)
            .collect();
        Self {
            config,
            loaders,
            ..Self::new()
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Add the tags of `library`, replacing builtins of the same name
    pub fn with_library(mut self, library: &Library) -> Self {
        self.library.extend(library);
        self
    }

    /// Append a loader; loaders are searched in the order they were added
    pub fn with_loader(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Register a component under its lowercased name
    pub fn with_component(mut self, component: ComponentType) -> Result<Self, ConfigError> {
        self.library.component(component)?;
        Ok(self)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library {
        &mut self.library
    }

    /// Compile template source with this engine's tag library
    pub fn from_string(&self, source: &str) -> Result<Template, ParseError> {
        let nodes = TemplateParser::new(source, &self.library).parse()?;
        Ok(Template::new(None, nodes))
    }

    /// Load and compile a named template, using the engine-wide cache
    pub fn get_template(&self, name: &str) -> Result<Arc<Template>, RenderError> {
        if let Some(template) = self.cached(name) {
            return Ok(template);
        }
        let source = self
            .loaders
            .iter()
            .find_map(|loader| loader.load(name))
            .ok_or_else(|| RenderError::TemplateNotFound {
                names: vec![name.to_string()],
            })?;
        tracing::debug!(template = name, "compiling template");
        let template = self.compile(name, &source)?;
        Ok(self.store(name.to_string(), template))
    }

    /// Load the first template in `names` that exists
    ///
    /// A candidate that exists but fails to compile is reported immediately
    /// rather than skipped.
    pub fn select_template<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Arc<Template>, RenderError> {
        for name in names {
            match self.get_template(name.as_ref()) {
                Err(RenderError::TemplateNotFound { .. }) => continue,
                other => return other,
            }
        }
        Err(RenderError::TemplateNotFound {
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        })
    }

    /// Compile a component's inline template, using the engine-wide cache
    pub(crate) fn inline_template(
        &self,
        component: &ComponentType,
        source: &str,
    ) -> Result<Arc<Template>, RenderError> {
        let key = format!("<inline:{}#{}>", component.name(), component.id());
        if let Some(template) = self.cached(&key) {
            return Ok(template);
        }
        let template = self.compile(&key, source)?;
        Ok(self.store(key, template))
    }

    /// Render a named template as a new top-level render of `ctx`
    pub fn render(self: &Arc<Self>, name: &str, ctx: &mut Context) -> Result<String, RenderError> {
        ctx.begin_render(self);
        self.get_template(name)?.render(ctx)
    }

    /// Compile and render template source as a new top-level render of `ctx`
    pub fn render_str(self: &Arc<Self>, source: &str, ctx: &mut Context) -> crate::Result<String> {
        ctx.begin_render(self);
        let template = self.from_string(source)?;
        Ok(template.render(ctx)?)
    }

    fn compile(&self, name: &str, source: &str) -> Result<Template, RenderError> {
        let nodes = TemplateParser::new(source, &self.library)
            .parse()
            .map_err(|error| RenderError::TemplateSyntax {
                name: name.to_string(),
                error,
            })?;
        Ok(Template::new(Some(name.to_string()), nodes))
    }

    fn cached(&self, key: &str) -> Option<Arc<Template>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: String, template: Template) -> Arc<Template> {
        let template = Arc::new(template);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&template));
        template
    }
}
