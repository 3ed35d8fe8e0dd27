//! Compiled template nodes

use std::fmt;

use crate::component::{ComponentNode, MediaNode, SlotNode};
use crate::error::RenderError;
use crate::parser::ast::{Expr, Spanned};

use super::escape::render_value;
use super::Context;

/// A node produced by a raw tag parse function
pub trait TagNode: fmt::Debug + Send + Sync {
    fn render(&self, ctx: &mut Context) -> Result<String, RenderError>;
}

/// One element of a compiled template
#[derive(Debug)]
pub enum Node {
    /// Literal text
    Text(String),
    /// `{{ expr }}` output
    Variable(Spanned<Expr>),
    Component(ComponentNode),
    Slot(SlotNode),
    Media(MediaNode),
    Custom(Box<dyn TagNode>),
}

impl Node {
    pub fn render(&self, ctx: &mut Context) -> Result<String, RenderError> {
        match self {
            Node::Text(text) => Ok(text.clone()),
            Node::Variable(expr) => render_variable(expr, ctx),
            Node::Component(component) => component.render(ctx),
            Node::Slot(slot) => slot.render(ctx),
            Node::Media(media) => media.render(ctx),
            Node::Custom(node) => node.render(ctx),
        }
    }

    pub fn as_slot(&self) -> Option<&SlotNode> {
        match self {
            Node::Slot(slot) => Some(slot),
            _ => None,
        }
    }
}

fn render_variable(expr: &Spanned<Expr>, ctx: &mut Context) -> Result<String, RenderError> {
    let engine = ctx.engine();
    let autoescape = engine.as_ref().map_or(true, |e| e.config().autoescape);
    match expr.node.resolve(ctx) {
        Ok(value) => Ok(render_value(&value, autoescape)),
        Err(RenderError::VariableNotFound { name }) => {
            tracing::debug!(variable = %name, span = ?expr.span, "rendering invalid variable");
            Ok(engine
                .map(|e| e.config().string_if_invalid.clone())
                .unwrap_or_default())
        }
        Err(err) => Err(err),
    }
}

/// An ordered sequence of nodes
#[derive(Debug, Default)]
pub struct NodeList(Vec<Node>);

impl NodeList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        // Adjacent text is merged so extracted slots leave one text node behind
        if let (Some(Node::Text(last)), Node::Text(text)) = (self.0.last_mut(), &node) {
            last.push_str(text);
            return;
        }
        self.0.push(node);
    }

    pub fn remove(&mut self, index: usize) -> Node {
        self.0.remove(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.0.iter()
    }

    /// Render every node in order and concatenate the output
    pub fn render(&self, ctx: &mut Context) -> Result<String, RenderError> {
        let mut out = String::new();
        for node in &self.0 {
            out.push_str(&node.render(ctx)?);
        }
        Ok(out)
    }
}

impl From<Vec<Node>> for NodeList {
    fn from(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }
}

impl IntoIterator for NodeList {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeList {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
