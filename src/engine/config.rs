//! Configuration for template rendering

use std::path::PathBuf;

use serde::Deserialize;

/// Default limit on nested component renders
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration options for an [`Engine`](super::Engine)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Directories searched for named templates, in order
    pub dirs: Vec<PathBuf>,

    /// Whether `{{ }}` output is HTML-escaped
    pub autoescape: bool,

    /// Output for variables that do not resolve
    pub string_if_invalid: String,

    /// Prefix for relative media paths (e.g., "/static/")
    pub static_url: Option<String>,

    /// Maximum nesting of component renders
    pub max_depth: usize,

    /// Keys copied from the caller into isolated component scopes
    pub inherited_keys: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            autoescape: true,
            string_if_invalid: String::new(),
            static_url: None,
            max_depth: DEFAULT_MAX_DEPTH,
            inherited_keys: vec!["request".to_string()],
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template directory
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dirs.push(dir.into());
        self
    }

    /// Set whether output is escaped
    pub fn with_autoescape(mut self, autoescape: bool) -> Self {
        self.autoescape = autoescape;
        self
    }

    /// Set the text rendered for unresolvable variables
    pub fn with_string_if_invalid(mut self, s: impl Into<String>) -> Self {
        self.string_if_invalid = s.into();
        self
    }

    /// Set the media path prefix
    pub fn with_static_url(mut self, url: impl Into<String>) -> Self {
        self.static_url = Some(url.into());
        self
    }

    /// Set the component nesting limit
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Replace the keys inherited by isolated component scopes
    pub fn with_inherited_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inherited_keys = keys.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.autoescape);
        assert_eq!(config.string_if_invalid, "");
        assert_eq!(config.static_url, None);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.inherited_keys, vec!["request".to_string()]);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .with_autoescape(false)
            .with_static_url("/static/")
            .with_max_depth(4)
            .with_inherited_keys(["request", "user"]);

        assert!(!config.autoescape);
        assert_eq!(config.static_url.as_deref(), Some("/static/"));
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.inherited_keys, vec!["request", "user"]);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig =
            toml::from_str("string_if_invalid = \"??\"").expect("valid engine table");
        assert_eq!(config.string_if_invalid, "??");
        assert!(config.autoescape);
    }
}
