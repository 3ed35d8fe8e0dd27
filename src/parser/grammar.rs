//! Tag and expression grammar using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::{self, Token};
use crate::value::Value;

/// Parse the inside of a `{% ... %}` block
///
/// `offset` is the byte position of `content` within the whole template so that
/// spans in the result and in errors point into the original source.
pub fn parse_tag(content: &str, offset: usize) -> Result<TagToken, ParseError> {
    let eoi = offset + content.len();
    let token_iter = lexer::lex(content)
        .map(move |(tok, span)| (tok, (span.start + offset..span.end + offset).into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((eoi..eoi).into(), |(t, s): (_, _)| (t, s));

    tag_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| first_error(errs, offset..eoi))
}

/// Parse the inside of a `{{ ... }}` region
pub fn parse_expression(content: &str, offset: usize) -> Result<Spanned<Expr>, ParseError> {
    let eoi = offset + content.len();
    let token_iter = lexer::lex(content)
        .map(move |(tok, span)| (tok, (span.start + offset..span.end + offset).into()));

    let token_stream =
        Stream::from_iter(token_iter).map((eoi..eoi).into(), |(t, s): (_, _)| (t, s));

    expression_parser()
        .map_with(|expr, e| Spanned::new(expr, span_range(&e.span())))
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| first_error(errs, offset..eoi))
}

fn first_error(errs: Vec<Rich<'_, Token>>, span: Span) -> ParseError {
    errs.into_iter()
        .next()
        .map(ParseError::from)
        .unwrap_or_else(|| ParseError::syntax(span, "invalid tag contents"))
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn expression_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let literal = select! {
        Token::String(s) => Value::String(s),
        Token::Int(n) => Value::Int(n),
        Token::Float(n) => Value::Float(n),
        Token::True => Value::Bool(true),
        Token::False => Value::Bool(false),
        Token::Null => Value::Null,
    }
    .map(Expr::Literal);

    let head = select! {
        Token::Ident(s) => s,
    };

    // Later segments may be list indices: items.0
    let segment = select! {
        Token::Ident(s) => s,
        Token::Int(n) => n.to_string(),
    };

    let variable = head
        .then(
            just(Token::Dot)
                .ignore_then(segment)
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(head, rest)| Expr::Variable(VariablePath::from_segments(head, rest)));

    choice((literal, variable))
}

fn tag_parser<'a, I>() -> impl Parser<'a, I, TagToken, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => s,
    }
    .map_with(|s, e| Spanned::new(s, span_range(&e.span())));

    let expression = expression_parser();

    // key=expr must be tried before a bare expression, which would otherwise
    // consume the key as a variable
    let keyword = identifier
        .clone()
        .then_ignore(just(Token::Equals))
        .then(expression.clone())
        .map_with(|(key, value), e| {
            Spanned::new(
                Bit::Keyword {
                    key: key.node,
                    value,
                },
                span_range(&e.span()),
            )
        });

    let with = just(Token::With).map_with(|_, e| Spanned::new(Bit::With, span_range(&e.span())));

    let positional = expression
        .map_with(|value, e| Spanned::new(Bit::Positional(value), span_range(&e.span())));

    let bit = choice((keyword, with, positional));

    identifier
        .then(bit.repeated().collect::<Vec<_>>())
        .then_ignore(end())
        .map_with(|(name, bits), e| TagToken {
            name,
            bits,
            span: span_range(&e.span()),
        })
}
