//! Lexers for template markup and tag contents using logos
//!
//! Templates are lexed in two passes. [`Markup`] splits the source into text,
//! `{{ variable }}` and `{% block %}` regions; the inside of each region is then
//! lexed into [`Token`]s for the tag grammar.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Top-level template regions
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Markup {
    /// `{% ... %}`, carrying the trimmed inner text
    #[regex(r"\{%([^%]|%[^}])*%\}", |lex| inner(lex.slice()))]
    Block(String),

    /// `{{ ... }}`, carrying the trimmed inner text
    #[regex(r"\{\{([^}]|\}[^}])*\}\}", |lex| inner(lex.slice()))]
    Variable(String),

    // Runs of plain text; a lone brace is text too
    #[regex(r"[^{]+", |lex| lex.slice().to_string())]
    #[token("{", |lex| lex.slice().to_string())]
    Text(String),

    #[regex(r"\{#([^#]|#[^}])*#\}", logos::skip)]
    Comment,
}

/// Strip the two-character delimiters and surrounding whitespace
fn inner(slice: &str) -> String {
    slice[2..slice.len() - 2].trim().to_string()
}

/// Byte offset of the trimmed inner text of a `{% %}` / `{{ }}` region
pub fn inner_offset(region: &str, region_start: usize) -> usize {
    let body = &region[2..region.len() - 2];
    let leading = body.len() - body.trim_start().len();
    region_start + 2 + leading
}

/// Tokens inside a block or variable region
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    #[token("with")]
    With,
    #[token("True")]
    True,
    #[token("False")]
    False,
    #[token("None")]
    Null,

    #[token("=")]
    Equals,
    #[token(".")]
    Dot,

    // Hyphens are allowed after the first character so HTML attribute names
    // like aria-label can be passed as keyword arguments
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unquote(lex.slice()))]
    String(String),

    #[regex(r"-?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    Float(f64),

    /// Input the lexer could not recognise, kept so the parser can report it
    Invalid(String),
}

/// Remove quotes and resolve backslash escapes
fn unquote(slice: &str) -> String {
    let body = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Lex template source into markup regions with spans
pub fn lex_markup(input: &str) -> impl Iterator<Item = (Markup, Span)> + '_ {
    Markup::lexer(input)
        .spanned()
        .map(|(tok, span)| match tok {
            Ok(t) => (t, span),
            Err(()) => (Markup::Text(input[span.clone()].to_string()), span),
        })
}

/// Lex the inside of a tag into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input).spanned().map(|(tok, span)| match tok {
        Ok(t) => (t, span),
        Err(()) => (Token::Invalid(input[span.clone()].to_string()), span),
    })
}
