//! Component Tags - reusable component tags for HTML templates
//!
//! This library lets you declare component tags with typed attributes, nested
//! slots and CSS/JS assets, and render templates that use them.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use component_tags::component::{AttributeSpec, Choices, ComponentType, RenderMode};
//! use component_tags::engine::{Context, Engine};
//!
//! let button = ComponentType::builder("button")
//!     .inline_template("<button {{ attributes }}>{{ content }}</button>")
//!     .attribute(
//!         "color",
//!         AttributeSpec::new()
//!             .with_choices(Choices::new().with("primary", "btn-primary"))
//!             .with_default("primary")
//!             .render_as(RenderMode::Class),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let engine = Arc::new(Engine::new().with_component(button).unwrap());
//! let html = engine
//!     .render_str("{% button %}Save{% endbutton %}", &mut Context::new())
//!     .unwrap();
//! assert_eq!(html, r#"<button class="btn-primary">Save</button>"#);
//! ```

pub mod component;
pub mod config;
pub mod engine;
pub mod error;
pub mod parser;
pub mod value;

pub use component::{AttributeSpec, Choices, ComponentType, Media, RenderMode};
pub use config::Config;
pub use engine::{Context, Engine, EngineConfig, Library, Template};
pub use error::{ConfigError, ParseError, RenderError};
pub use value::{Map, Value};

use std::sync::Arc;

use thiserror::Error;

/// Errors from the convenience entry points
#[derive(Debug, Error)]
pub enum Error {
    /// Error while compiling a template
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error while rendering
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Error while loading configuration or declaring components
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Render template source with the builtin tags only
///
/// # Example
///
/// ```rust
/// use component_tags::{render, Context};
///
/// let mut ctx = Context::new();
/// ctx.set("name", "<World>");
/// assert_eq!(render("Hello {{ name }}", &mut ctx).unwrap(), "Hello &lt;World&gt;");
/// ```
pub fn render(source: &str, ctx: &mut Context) -> Result<String> {
    render_with_engine(source, Arc::new(Engine::new()), ctx)
}

/// Render template source with a configured engine
pub fn render_with_engine(source: &str, engine: Arc<Engine>, ctx: &mut Context) -> Result<String> {
    engine.render_str(source, ctx)
}
