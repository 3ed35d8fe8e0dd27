//! Template source loaders

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A source of template text, looked up by name
pub trait TemplateLoader: fmt::Debug + Send + Sync {
    /// Return the source of `name`, or `None` when this loader does not have it
    fn load(&self, name: &str) -> Option<String>;
}

/// Templates held in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    templates: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a template, replacing any previous source with the same name
    pub fn with_template(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.templates.insert(name.into(), source.into());
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateLoader for MemoryLoader {
    fn load(&self, name: &str) -> Option<String> {
        self.templates.get(name).cloned()
    }
}

/// Templates read from a directory
///
/// Names are relative paths; parent-directory components and absolute paths are
/// rejected so that only files below the base directory can be read.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    base_dir: PathBuf,
}

impl FileSystemLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn resolve(&self, name: &str) -> Option<PathBuf> {
        let relative = Path::new(name);
        let traverses = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if traverses {
            tracing::warn!(name, "rejected template path outside the loader directory");
            return None;
        }
        Some(self.base_dir.join(relative))
    }
}

impl TemplateLoader for FileSystemLoader {
    fn load(&self, name: &str) -> Option<String> {
        let path = self.resolve(name)?;
        if !path.is_file() {
            return None;
        }
        match fs::read_to_string(&path) {
            Ok(source) => Some(source),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "failed to read template");
                None
            }
        }
    }
}
