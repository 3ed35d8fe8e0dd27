//! Tag library: the registry mapping tag names to parse functions

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::component::{
    parse_component, ComponentNode, ComponentType, MediaKind, MediaNode, SlotNode,
};
use crate::error::{ConfigError, ParseError};
use crate::parser::ast::TagToken;
use crate::parser::TemplateParser;

use super::Node;

/// A tag parse function
///
/// Called with the parser positioned just after the opening tag; block tags
/// consume their body and end tag through the parser.
pub type TagParser =
    Arc<dyn Fn(&mut TemplateParser<'_>, TagToken) -> Result<Node, ParseError> + Send + Sync>;

/// Box a closure as a [`TagParser`]
pub fn tag_parser<F>(f: F) -> TagParser
where
    F: Fn(&mut TemplateParser<'_>, TagToken) -> Result<Node, ParseError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What can be registered under a tag name
pub enum TagRegistration {
    /// A raw parse function
    Parser(TagParser),
    /// A component type, wrapped with the standard component parse routine
    Component(ComponentType),
}

impl TagRegistration {
    pub fn parser<F>(f: F) -> Self
    where
        F: Fn(&mut TemplateParser<'_>, TagToken) -> Result<Node, ParseError>
            + Send
            + Sync
            + 'static,
    {
        TagRegistration::Parser(tag_parser(f))
    }
}

impl From<ComponentType> for TagRegistration {
    fn from(component: ComponentType) -> Self {
        TagRegistration::Component(component)
    }
}

/// A parse function ready to be stored in a [`Library`]
pub struct RegisteredTag {
    pub name: String,
    pub parser: TagParser,
}

/// Wrap a component type as a block tag named `name`
///
/// The resulting parse function reads the body up to `end<name>`, splits the tag
/// arguments into positional, keyword and `with` options, extracts slots and
/// builds a [`ComponentNode`].
pub fn wrap_as_tag(name: impl Into<String>, component: Arc<ComponentType>) -> RegisteredTag {
    let parser = tag_parser(move |parser, token| {
        let args = parse_component(parser, token)?;
        Ok(Node::Component(ComponentNode::new(Arc::clone(&component), args)))
    });
    RegisteredTag {
        name: name.into(),
        parser,
    }
}

/// Registry of available tags
#[derive(Clone, Default)]
pub struct Library {
    tags: HashMap<String, TagParser>,
    components: HashMap<String, Arc<ComponentType>>,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("tags", &self.names())
            .finish()
    }
}

impl Library {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding the builtin tags: `slot`, `component_css` and
    /// `component_js`
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        library.tag("slot", |parser, token| {
            let args = parse_component(parser, token)?;
            Ok(Node::Slot(SlotNode::from_invocation(args)))
        });
        library.tag("component_css", |parser, _token| {
            let body = parser.parse_to_end()?;
            Ok(Node::Media(MediaNode::new(MediaKind::Css, body)))
        });
        library.tag("component_js", |parser, _token| {
            let body = parser.parse_to_end()?;
            Ok(Node::Media(MediaNode::new(MediaKind::Js, body)))
        });
        library
    }

    /// Register a parse function or a component type under `name`
    pub fn register(
        &mut self,
        name: impl Into<String>,
        registration: impl Into<TagRegistration>,
    ) -> &mut Self {
        let name = name.into();
        match registration.into() {
            TagRegistration::Parser(parser) => {
                self.components.remove(&name);
                self.tags.insert(name, parser);
            }
            TagRegistration::Component(component) => {
                let component = Arc::new(component);
                let tag = wrap_as_tag(name, Arc::clone(&component));
                self.components.insert(tag.name.clone(), component);
                self.tags.insert(tag.name, tag.parser);
            }
        }
        self
    }

    /// Register a raw parse function
    pub fn tag<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut TemplateParser<'_>, TagToken) -> Result<Node, ParseError>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, TagRegistration::parser(f))
    }

    /// Register a component type under its own lowercased name
    pub fn component(&mut self, component: ComponentType) -> Result<&mut Self, ConfigError> {
        let name = component.name().to_lowercase();
        if name.starts_with("end") {
            return Err(ConfigError::invalid(format!(
                "component name '{}' collides with end tags",
                name
            )));
        }
        Ok(self.register(name, component))
    }

    /// Copy every tag of `other` into this library, replacing same-named tags
    pub fn extend(&mut self, other: &Library) {
        for (name, parser) in &other.tags {
            self.tags.insert(name.clone(), Arc::clone(parser));
        }
        for (name, component) in &other.components {
            self.components.insert(name.clone(), Arc::clone(component));
        }
    }

    pub fn get(&self, name: &str) -> Option<&TagParser> {
        self.tags.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    /// The component type registered under `name`, if that tag is a component
    pub fn component_type(&self, name: &str) -> Option<&Arc<ComponentType>> {
        self.components.get(name)
    }

    /// All tag names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tags.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}
