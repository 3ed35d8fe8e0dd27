//! TOML configuration: engine settings, named templates and component declarations
//!
//! ```toml
//! [engine]
//! static_url = "/static/"
//!
//! [templates]
//! "components/button.html" = "<button {{ attributes }}>{{ content }}</button>"
//!
//! [components.button]
//! template = "components/button.html"
//! media = { css = ["button.css"] }
//!
//! [[components.button.attributes]]
//! field = "color"
//! choices = { primary = "btn-primary", secondary = "btn-secondary" }
//! default = "primary"
//! mode = "class"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::component::{AttributeSpec, Choices, ComponentType, Media, RenderMode};
use crate::engine::{Engine, EngineConfig, MemoryLoader};
use crate::error::ConfigError;
use crate::value::Value;

/// A loaded configuration file
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub engine: EngineConfig,
    pub templates: IndexMap<String, String>,
    pub components: IndexMap<String, ComponentConfig>,
}

/// One `[components.<name>]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComponentConfig {
    pub template: Option<String>,
    pub templates: Vec<String>,
    pub inline: Option<String>,
    pub isolated: Option<bool>,
    pub media: Media,
    pub attributes: Vec<AttributeConfig>,
}

/// One `[[components.<name>.attributes]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeConfig {
    pub field: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub choices: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub default: Option<toml::Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub mode: RenderMode,
}

/// TOML structure for deserializing configuration files
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    #[serde(default)]
    engine: EngineConfig,
    #[serde(default)]
    templates: IndexMap<String, String>,
    #[serde(default)]
    components: IndexMap<String, ComponentConfig>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        Ok(Config {
            engine: parsed.engine,
            templates: parsed.templates,
            components: parsed.components,
        })
    }

    /// Build every declared component type, in declaration order
    pub fn component_types(&self) -> Result<Vec<ComponentType>, ConfigError> {
        self.components
            .iter()
            .map(|(name, component)| component.to_component_type(name))
            .collect()
    }

    /// Build an engine with the configured directories, templates and components
    pub fn into_engine(self) -> Result<Engine, ConfigError> {
        let components = self.component_types()?;
        let mut engine = Engine::from_config(self.engine);
        if !self.templates.is_empty() {
            let loader = self
                .templates
                .into_iter()
                .fold(MemoryLoader::new(), |loader, (name, source)| {
                    loader.with_template(name, source)
                });
            engine = engine.with_loader(loader);
        }
        for component in components {
            tracing::debug!(component = component.name(), "registering component");
            engine = engine.with_component(component)?;
        }
        Ok(engine)
    }
}

impl ComponentConfig {
    pub fn to_component_type(&self, name: &str) -> Result<ComponentType, ConfigError> {
        let mut builder = ComponentType::builder(name)
            .media(self.media.clone())
            .isolated(self.isolated.unwrap_or(true));

        let named = self.template.is_some() || !self.templates.is_empty();
        builder = match (&self.inline, named) {
            (Some(_), true) => {
                return Err(ConfigError::invalid(format!(
                    "component '{}' sets both an inline and a named template",
                    name
                )))
            }
            (Some(source), false) => builder.inline_template(source.clone()),
            (None, true) => builder.template_names(
                self.template.iter().chain(self.templates.iter()).cloned(),
            ),
            (None, false) => builder,
        };

        for attribute in &self.attributes {
            builder = builder.attribute(attribute.field.clone(), attribute.to_spec());
        }
        builder.build()
    }
}

impl AttributeConfig {
    pub fn to_spec(&self) -> AttributeSpec {
        let mut spec = AttributeSpec::new()
            .required(self.required)
            .render_as(self.mode);
        if let Some(name) = &self.name {
            spec = spec.with_name(name.clone());
        }
        if let Some(choices) = &self.choices {
            let choices: Choices = choices
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            spec = spec.with_choices(choices);
        }
        if let Some(default) = &self.default {
            spec = spec.with_default(Value::from(default.clone()));
        }
        spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BUTTON: &str = r#"
[engine]
static_url = "/static/"

[templates]
"components/button.html" = "<button {{ attributes }}>{{ content }}</button>"

[components.button]
template = "components/button.html"
media = { css = ["button.css"] }

[[components.button.attributes]]
field = "color"
choices = { primary = "btn-primary", secondary = "btn-secondary" }
default = "primary"
mode = "class"
"#;

    #[test]
    fn test_parse_config() {
        let config = Config::from_str(BUTTON).expect("valid config");
        assert_eq!(config.engine.static_url.as_deref(), Some("/static/"));
        assert_eq!(config.templates.len(), 1);

        let button = &config.components["button"];
        assert_eq!(button.template.as_deref(), Some("components/button.html"));
        assert_eq!(button.media.css().to_vec(), vec!["button.css"]);
        assert_eq!(button.attributes[0].mode, RenderMode::Class);
    }

    #[test]
    fn test_component_types_built() {
        let config = Config::from_str(BUTTON).expect("valid config");
        let types = config.component_types().expect("valid components");
        assert_eq!(types.len(), 1);
        let color = types[0].attribute("color").expect("declared");
        assert_eq!(color.name(), "color");
        assert_eq!(color.resolve_default(), Ok(Value::from("btn-primary")));
    }

    #[test]
    fn test_inline_and_named_conflict() {
        let config = Config::from_str(
            r#"
[components.card]
template = "card.html"
inline = "<div></div>"
"#,
        )
        .expect("valid toml");
        assert!(matches!(
            config.component_types(),
            Err(ConfigError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_invalid_default_reported_before_render() {
        let config = Config::from_str(
            r#"
[components.badge]
inline = "{{ attributes }}"

[[components.badge.attributes]]
field = "tone"
choices = { info = "badge-info" }
default = "loud"
"#,
        )
        .expect("valid toml");
        assert!(config.into_engine().is_err());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(matches!(
            Config::from_str("[components.card]\ncolour = \"red\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("components.toml");
        std::fs::write(&path, BUTTON).expect("write config");
        let config = Config::from_file(&path).expect("valid config");
        assert!(config.components.contains_key("button"));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::from_file(Path::new("/nonexistent/components.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
