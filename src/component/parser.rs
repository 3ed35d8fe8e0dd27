//! Parse routine shared by every component tag
//!
//! `{% name [expr ...] [key=expr ...] [with key=expr ...] %}body{% endname %}`
//!
//! The body is read up to the end tag and `{% slot %}` blocks directly inside
//! it are moved into the slot map.

use indexmap::IndexMap;

use crate::engine::{Node, NodeList};
use crate::error::ParseError;
use crate::parser::ast::{Bit, Expr, Span, TagToken};
use crate::parser::TemplateParser;

use super::slot::{SlotKey, SlotNode};

/// Everything extracted from one component tag
#[derive(Debug, Default)]
pub struct ComponentArgs {
    pub tag_name: String,
    pub span: Span,
    pub body: NodeList,
    pub args: Vec<Expr>,
    pub kwargs: IndexMap<String, Expr>,
    pub options: IndexMap<String, Expr>,
    pub slots: IndexMap<SlotKey, SlotNode>,
}

/// Read a component tag's arguments, body and slots
pub fn parse_component(
    parser: &mut TemplateParser<'_>,
    token: TagToken,
) -> Result<ComponentArgs, ParseError> {
    let mut args = split_bits(&token)?;
    let end_tag = format!("end{}", token.name());
    let (body, _) = parser.parse_until(&[end_tag.as_str()], &token)?;
    let (body, slots) = extract_slots(&token, body)?;
    args.body = body;
    args.slots = slots;
    Ok(args)
}

/// Sort tag bits into positional arguments, keyword arguments and `with` options
pub fn split_bits(token: &TagToken) -> Result<ComponentArgs, ParseError> {
    let mut args = ComponentArgs {
        tag_name: token.name().to_string(),
        span: token.span.clone(),
        ..ComponentArgs::default()
    };
    let mut with_span: Option<Span> = None;

    for bit in &token.bits {
        match &bit.node {
            Bit::With if with_span.is_none() => with_span = Some(bit.span.clone()),
            Bit::With => return Err(ParseError::syntax(bit.span.clone(), "'with' given twice")),
            Bit::Keyword { key, value } => {
                let bucket = if with_span.is_some() {
                    &mut args.options
                } else {
                    &mut args.kwargs
                };
                if bucket.insert(key.clone(), value.clone()).is_some() {
                    return Err(ParseError::DuplicateArgument {
                        tag: args.tag_name.clone(),
                        key: key.clone(),
                        span: bit.span.clone(),
                    });
                }
            }
            Bit::Positional(_) if with_span.is_some() => {
                return Err(ParseError::syntax(
                    bit.span.clone(),
                    format!("'{}' expects key=value pairs after 'with'", args.tag_name),
                ));
            }
            Bit::Positional(expr) => args.args.push(expr.clone()),
        }
    }

    match with_span {
        Some(span) if args.options.is_empty() => Err(ParseError::EmptyWith {
            tag: args.tag_name,
            span,
        }),
        _ => Ok(args),
    }
}

/// Move the `{% slot %}` nodes of `body` into a slot map
///
/// Unnamed slots are keyed by their position among all sibling slots. Two
/// slots that would land on the same context variable are rejected.
pub fn extract_slots(
    token: &TagToken,
    body: NodeList,
) -> Result<(NodeList, IndexMap<SlotKey, SlotNode>), ParseError> {
    let mut rest = NodeList::new();
    let mut slots = IndexMap::new();
    let mut index = 0;

    for node in body {
        match node {
            Node::Slot(slot) => {
                let key = match slot.name() {
                    Some(name) => SlotKey::Named(name.to_string()),
                    None => SlotKey::Index(index),
                };
                index += 1;
                let context_key = key.context_key();
                if slots.keys().any(|k: &SlotKey| k.context_key() == context_key) {
                    return Err(ParseError::DuplicateSlot {
                        tag: token.name().to_string(),
                        slot: key.to_string(),
                        span: token.span.clone(),
                    });
                }
                slots.insert(key, slot);
            }
            other => rest.push(other),
        }
    }
    Ok((rest, slots))
}
