//! Syntax tree types for tag contents and expressions

use std::fmt;

use crate::engine::Lookup;
use crate::error::RenderError;
use crate::value::Value;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

/// Dotted variable reference such as `user.profile.name` or `items.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariablePath {
    segments: Vec<String>,
}

impl VariablePath {
    pub fn new(head: impl Into<String>) -> Self {
        Self {
            segments: vec![head.into()],
        }
    }

    /// Build a path from its first segment and any trailing segments
    pub fn from_segments(head: String, rest: Vec<String>) -> Self {
        let mut segments = Vec::with_capacity(rest.len() + 1);
        segments.push(head);
        segments.extend(rest);
        Self { segments }
    }

    /// Parse `a.b.c` without validation
    pub fn parse(path: &str) -> Self {
        Self {
            segments: path.split('.').map(str::to_string).collect(),
        }
    }

    pub fn head(&self) -> &str {
        &self.segments[0]
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for VariablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A lazily evaluated value
///
/// Literals resolve to themselves; variables are looked up in a scope when the
/// expression is resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Variable(VariablePath),
}

impl Expr {
    /// Shorthand for a variable reference
    pub fn var(path: &str) -> Self {
        Expr::Variable(VariablePath::parse(path))
    }

    /// Evaluate the expression against a scope
    pub fn resolve<L: Lookup + ?Sized>(&self, scope: &L) -> Result<Value, RenderError> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(path) => {
                let not_found = || RenderError::VariableNotFound {
                    name: path.to_string(),
                };
                let root = scope.lookup(path.head()).ok_or_else(not_found)?;
                let mut current = &root;
                for segment in &path.segments()[1..] {
                    current = current.get_segment(segment).ok_or_else(not_found)?;
                }
                Ok(current.clone())
            }
        }
    }

    /// The literal value, if this expression needs no scope
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(value) => Some(value),
            Expr::Variable(_) => None,
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Literal(Value::from(s))
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Literal(Value::from(s))
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Self {
        expr.clone()
    }
}

/// One argument inside a tag
#[derive(Debug, Clone, PartialEq)]
pub enum Bit {
    /// A bare expression
    Positional(Expr),
    /// `key=expr`
    Keyword { key: String, value: Expr },
    /// The `with` keyword separating attribute candidates from options
    With,
}

/// The parsed contents of a `{% ... %}` block
#[derive(Debug, Clone, PartialEq)]
pub struct TagToken {
    pub name: Spanned<String>,
    pub bits: Vec<Spanned<Bit>>,
    pub span: Span,
}

impl TagToken {
    pub fn name(&self) -> &str {
        &self.name.node
    }
}
