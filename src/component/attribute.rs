//! Attribute declarations and their resolution
//!
//! An [`AttributeSpec`] describes one configurable value on a component. At
//! render time the raw tag argument (or the declared default) is resolved
//! against the caller's context and validated:
//!
//! 1. a lazy expression is evaluated (may fail with `VariableNotFound`)
//! 2. null with `required` set fails with `RequiredValueMissing`
//! 3. with choices, the value is mapped by key (or kept if it already is a
//!    rendered choice), otherwise `ChoiceNotFound`
//! 4. anything else passes through unchanged

use std::sync::OnceLock;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::engine::Lookup;
use crate::error::{ConfigError, RenderError};
use crate::parser::ast::Expr;
use crate::value::Value;

/// Where a resolved attribute ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// `name="value"` in the attribute string
    #[default]
    Attribute,
    /// Appended to the `class` list
    Class,
    /// A plain context variable
    Context,
}

/// An ordered enumeration of symbolic keys and their rendered strings
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Choices(IndexMap<String, String>);

impl Choices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, rendered: impl Into<String>) -> Self {
        self.0.insert(key.into(), rendered.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    /// The rendered string for `value`, matched by key first, then by rendered value
    pub fn lookup(&self, value: &Value) -> Option<&str> {
        if matches!(value, Value::List(_) | Value::Map(_)) {
            return None;
        }
        let text = value.to_string();
        self.0
            .get(&text)
            .or_else(|| self.0.values().find(|rendered| **rendered == text))
            .map(|s| s.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Choices {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// One declared attribute of a component
#[derive(Debug, Clone, Default)]
pub struct AttributeSpec {
    name: OnceLock<String>,
    choices: Option<Choices>,
    default: Option<Value>,
    required: bool,
    mode: RenderMode,
}

impl AttributeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit name; otherwise the declaring field name is used
    pub fn with_name(self, name: impl Into<String>) -> Self {
        let _ = self.name.set(name.into());
        self
    }

    pub fn with_choices(mut self, choices: Choices) -> Self {
        self.choices = Some(choices);
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn render_as(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// The attribute name, empty until bound
    pub fn name(&self) -> &str {
        self.name.get().map_or("", |s| s.as_str())
    }

    /// Assign the name from the declaring field unless one was already set
    pub fn bind_name(&self, field: &str) {
        let _ = self.name.get_or_init(|| field.to_string());
    }

    pub fn choices(&self) -> Option<&Choices> {
        self.choices.as_ref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn has_default(&self) -> bool {
        self.default.as_ref().is_some_and(|v| !v.is_null())
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Check the declaration itself; called once when the component type is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(choices) = &self.choices {
            if choices.is_empty() {
                return Err(ConfigError::invalid(format!(
                    "attribute '{}' declares an empty choice set",
                    self.name()
                )));
            }
        }
        match &self.default {
            Some(Value::Null) if self.required => Err(ConfigError::invalid(format!(
                "attribute '{}' is required and cannot default to null",
                self.name()
            ))),
            Some(default) if !default.is_null() => self
                .check_value(default.clone())
                .map(|_| ())
                .map_err(|err| ConfigError::invalid(format!("invalid default: {}", err))),
            _ => Ok(()),
        }
    }

    /// Resolve a raw tag argument (or its absence) against `scope`
    pub fn resolve<L: Lookup + ?Sized>(
        &self,
        raw: Option<&Expr>,
        scope: &L,
    ) -> Result<Value, RenderError> {
        let value = match raw {
            Some(expr) => expr.resolve(scope)?,
            None => Value::Null,
        };
        self.check_value(value)
    }

    /// Resolve the declared default; nothing is evaluated
    pub fn resolve_default(&self) -> Result<Value, RenderError> {
        self.check_value(self.default.clone().unwrap_or_default())
    }

    /// Resolve a supplied argument, falling back to the default when the
    /// argument names a variable that does not exist
    pub fn resolve_or_default<L: Lookup + ?Sized>(
        &self,
        raw: &Expr,
        scope: &L,
    ) -> Result<Value, RenderError> {
        match self.resolve(Some(raw), scope) {
            Err(RenderError::VariableNotFound { name }) if self.has_default() => {
                tracing::trace!(attribute = self.name(), variable = %name, "using default");
                self.resolve_default()
            }
            other => other,
        }
    }

    fn check_value(&self, value: Value) -> Result<Value, RenderError> {
        if value.is_null() {
            return if self.required {
                Err(RenderError::RequiredValueMissing {
                    attribute: self.name().to_string(),
                })
            } else {
                Ok(Value::Null)
            };
        }
        match &self.choices {
            Some(choices) => match choices.lookup(&value) {
                Some(rendered) => Ok(Value::String(rendered.to_string())),
                None => Err(RenderError::ChoiceNotFound {
                    attribute: self.name().to_string(),
                    value: value.to_string(),
                    choices: choices.keys(),
                }),
            },
            None => Ok(value),
        }
    }
}
