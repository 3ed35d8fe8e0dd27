//! Component assets and the tags that emit them

use serde::Deserialize;

use crate::engine::escape::escape_html;
use crate::engine::{Context, NodeList};
use crate::error::RenderError;

/// CSS and JS references declared by a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Media {
    css: Vec<String>,
    js: Vec<String>,
}

impl Media {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_css(mut self, path: impl Into<String>) -> Self {
        push_unique(&mut self.css, path.into());
        self
    }

    pub fn with_js(mut self, path: impl Into<String>) -> Self {
        push_unique(&mut self.js, path.into());
        self
    }

    pub fn css(&self) -> &[String] {
        &self.css
    }

    pub fn js(&self) -> &[String] {
        &self.js
    }

    pub fn is_empty(&self) -> bool {
        self.css.is_empty() && self.js.is_empty()
    }

    /// Append the paths of `other` that are not already present, keeping order
    pub fn merge(&mut self, other: &Media) {
        for path in &other.css {
            push_unique(&mut self.css, path.clone());
        }
        for path in &other.js {
            push_unique(&mut self.js, path.clone());
        }
    }

    pub fn render_css(&self, static_url: Option<&str>) -> String {
        self.css
            .iter()
            .map(|path| {
                format!(
                    r#"<link href="{}" media="all" rel="stylesheet">"#,
                    escape_html(&absolute_path(path, static_url))
                )
            })
            .collect()
    }

    pub fn render_js(&self, static_url: Option<&str>) -> String {
        self.js
            .iter()
            .map(|path| {
                format!(
                    r#"<script src="{}"></script>"#,
                    escape_html(&absolute_path(path, static_url))
                )
            })
            .collect()
    }
}

fn push_unique(paths: &mut Vec<String>, path: String) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn absolute_path(path: &str, static_url: Option<&str>) -> String {
    let absolute =
        path.starts_with("http://") || path.starts_with("https://") || path.starts_with('/');
    match static_url {
        Some(prefix) if !absolute => {
            format!("{}/{}", prefix.trim_end_matches('/'), path)
        }
        _ => path.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Css,
    Js,
}

/// `{% component_css %}` / `{% component_js %}`
///
/// Holds the rest of the template. The body renders first so every component
/// in it has contributed its assets by the time the tags are emitted.
#[derive(Debug)]
pub struct MediaNode {
    kind: MediaKind,
    body: NodeList,
}

impl MediaNode {
    pub fn new(kind: MediaKind, body: NodeList) -> Self {
        Self { kind, body }
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn render(&self, ctx: &mut Context) -> Result<String, RenderError> {
        let rendered = self.body.render(ctx)?;
        let media = ctx.media();
        let static_url = ctx.engine().and_then(|e| e.config().static_url.clone());
        let tags = match self.kind {
            MediaKind::Css => media.render_css(static_url.as_deref()),
            MediaKind::Js => media.render_js(static_url.as_deref()),
        };
        tracing::trace!(
            kind = ?self.kind,
            css = media.css().len(),
            js = media.js().len(),
            "emitting media"
        );
        Ok(tags + &rendered)
    }
}
