//! Named nested content blocks

use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::engine::{Context, NodeList};
use crate::error::RenderError;
use crate::parser::ast::Expr;
use crate::value::Value;

use super::node::{ComponentNode, ComponentType};
use super::parser::ComponentArgs;

/// How a slot is identified inside its parent component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SlotKey {
    Named(String),
    /// Position among the sibling slots of one component body
    Index(usize),
}

impl SlotKey {
    /// Context key the rendered slot is stored under
    pub fn context_key(&self) -> String {
        format!("slot_{}", self)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKey::Named(name) => f.write_str(name),
            SlotKey::Index(index) => write!(f, "{}", index),
        }
    }
}

fn slot_type() -> Arc<ComponentType> {
    static SLOT: OnceLock<Arc<ComponentType>> = OnceLock::new();
    Arc::clone(SLOT.get_or_init(|| Arc::new(ComponentType::slot())))
}

/// `{% slot [name] %}...{% endslot %}`
///
/// Always renders non-isolated so the body sees the variables of the
/// component it belongs to.
#[derive(Debug)]
pub struct SlotNode {
    slot_name: Option<String>,
    node: ComponentNode,
}

impl SlotNode {
    pub fn from_invocation(args: ComponentArgs) -> Self {
        let slot_name = args.args.first().map(slot_name);
        Self {
            slot_name,
            node: ComponentNode::new(slot_type(), args).with_isolation(false),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.slot_name.as_deref()
    }

    pub fn body(&self) -> &NodeList {
        self.node.body()
    }

    pub fn render(&self, ctx: &mut Context) -> Result<String, RenderError> {
        self.node.render(ctx)
    }
}

// A bare identifier names the slot rather than a variable to look up
fn slot_name(expr: &Expr) -> String {
    match expr {
        Expr::Literal(Value::String(name)) | Expr::Literal(Value::Safe(name)) => name.clone(),
        Expr::Literal(other) => other.to_string(),
        Expr::Variable(path) => path.to_string(),
    }
}
