//! Template parser: turns markup regions into a node list
//!
//! Block tags are dispatched through the [`Library`]. A tag's parse function
//! receives the parser and may consume further tokens, for example a component
//! reading its body up to its end tag.

use std::sync::Arc;

use crate::engine::{Library, Node, NodeList};
use crate::error::ParseError;

use super::ast::TagToken;
use super::grammar::{parse_expression, parse_tag};
use super::lexer::{inner_offset, lex_markup, Markup, Span};

pub struct TemplateParser<'a> {
    source: &'a str,
    tokens: Vec<(Markup, Span)>,
    pos: usize,
    library: &'a Library,
}

impl<'a> TemplateParser<'a> {
    pub fn new(source: &'a str, library: &'a Library) -> Self {
        Self {
            source,
            tokens: lex_markup(source).collect(),
            pos: 0,
            library,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn library(&self) -> &'a Library {
        self.library
    }

    /// Parse the whole template
    pub fn parse(mut self) -> Result<NodeList, ParseError> {
        let (nodes, end) = self.parse_nodes(&[])?;
        debug_assert!(end.is_none());
        Ok(nodes)
    }

    /// Parse nodes until one of the `ends` tags, returning the body and the end tag
    ///
    /// Reaching the end of the template first is an [`ParseError::UnclosedTag`]
    /// for `opening`.
    pub fn parse_until(
        &mut self,
        ends: &[&str],
        opening: &TagToken,
    ) -> Result<(NodeList, TagToken), ParseError> {
        match self.parse_nodes(ends)? {
            (nodes, Some(end)) => Ok((nodes, end)),
            (_, None) => Err(ParseError::UnclosedTag {
                name: opening.name().to_string(),
                span: opening.span.clone(),
                expected: ends.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    /// Parse everything left in the template
    pub fn parse_to_end(&mut self) -> Result<NodeList, ParseError> {
        let (nodes, _) = self.parse_nodes(&[])?;
        Ok(nodes)
    }

    fn parse_nodes(&mut self, ends: &[&str]) -> Result<(NodeList, Option<TagToken>), ParseError> {
        let mut nodes = NodeList::new();
        while let Some((markup, span)) = self.tokens.get(self.pos).cloned() {
            self.pos += 1;
            match markup {
                Markup::Text(text) => nodes.push(Node::Text(text)),
                Markup::Comment => {}
                Markup::Variable(inner) => {
                    if inner.is_empty() {
                        return Err(ParseError::syntax(span, "Empty variable tag"));
                    }
                    let offset = inner_offset(&self.source[span.clone()], span.start);
                    nodes.push(Node::Variable(parse_expression(&inner, offset)?));
                }
                Markup::Block(inner) => {
                    if inner.is_empty() {
                        return Err(ParseError::syntax(span, "Empty block tag"));
                    }
                    let offset = inner_offset(&self.source[span.clone()], span.start);
                    let tag = parse_tag(&inner, offset)?;
                    if ends.contains(&tag.name()) {
                        return Ok((nodes, Some(tag)));
                    }
                    nodes.push(self.dispatch(tag)?);
                }
            }
        }
        Ok((nodes, None))
    }

    fn dispatch(&mut self, tag: TagToken) -> Result<Node, ParseError> {
        let library = self.library;
        match library.get(tag.name()) {
            Some(parse) => {
                let parse = Arc::clone(parse);
                parse(self, tag)
            }
            None if tag.name().starts_with("end") => Err(ParseError::UnexpectedTag {
                name: tag.name().to_string(),
                span: tag.name.span.clone(),
            }),
            None => Err(ParseError::UnknownTag {
                name: tag.name().to_string(),
                span: tag.name.span.clone(),
            }),
        }
    }
}
