//! Error types for template parsing, rendering and configuration

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Template syntax errors, raised while a template is compiled
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("Invalid block tag '{name}'")]
    UnknownTag { name: String, span: Span },

    #[error("Unclosed tag '{name}', looking for one of: {}", expected.join(", "))]
    UnclosedTag {
        name: String,
        span: Span,
        expected: Vec<String>,
    },

    #[error("Unexpected tag '{name}'")]
    UnexpectedTag { name: String, span: Span },

    #[error("'{tag}' received multiple values for keyword argument '{key}'")]
    DuplicateArgument { tag: String, key: String, span: Span },

    #[error("'{tag}' defines slot '{slot}' more than once")]
    DuplicateSlot { tag: String, slot: String, span: Span },

    #[error("\"with\" in '{tag}' tag needs at least one keyword argument")]
    EmptyWith { tag: String, span: Span },
}

impl ParseError {
    /// Create a syntax error without expectations
    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            span,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            ParseError::Syntax { span, .. }
            | ParseError::UnknownTag { span, .. }
            | ParseError::UnclosedTag { span, .. }
            | ParseError::UnexpectedTag { span, .. }
            | ParseError::DuplicateArgument { span, .. }
            | ParseError::DuplicateSlot { span, .. }
            | ParseError::EmptyWith { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span().clone();
        let (message, note) = match self {
            ParseError::Syntax {
                message, expected, ..
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (message.clone(), format!("{}{}", message, expected_str))
            }
            other => (other.to_string(), other.to_string()),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(note)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => message,
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => match found {
                Some(tok) => format!("Unexpected {}", format_token(tok)),
                None => "Unexpected end of tag".to_string(),
            },
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of tag".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string \"{}\"", s),
        Token::Int(n) => format!("number {}", n),
        Token::Float(n) => format!("number {}", n),
        Token::With => "keyword 'with'".to_string(),
        Token::True => "'True'".to_string(),
        Token::False => "'False'".to_string(),
        Token::Null => "'None'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Invalid(s) => format!("'{}'", s),
    }
}

/// Errors raised while rendering a template
///
/// Attribute resolution failures abort the component being rendered; the caller
/// decides whether the surrounding page fails too.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// A required attribute resolved to null
    #[error("attribute '{attribute}' is required and cannot be null")]
    RequiredValueMissing { attribute: String },

    /// A value is not part of the attribute's choice set
    #[error("'{value}' is not an available choice for '{attribute}', choices are: {}", choices.join(", "))]
    ChoiceNotFound {
        attribute: String,
        value: String,
        choices: Vec<String>,
    },

    /// A referenced context variable does not exist
    #[error("variable '{name}' does not exist")]
    VariableNotFound { name: String },

    /// The component has no template configured
    #[error("template is undefined for component '{component}'")]
    TemplateUndefined { component: String },

    /// None of the candidate template names could be loaded
    #[error("template not found: {}", names.join(", "))]
    TemplateNotFound { names: Vec<String> },

    /// A template loaded during rendering failed to compile
    #[error("syntax error in template '{name}': {error}")]
    TemplateSyntax { name: String, error: ParseError },

    /// Component rendering nested deeper than the configured limit
    #[error("component nesting exceeded {limit} levels while rendering '{component}'")]
    RecursionLimit { component: String, limit: usize },
}

/// Declaration-time and configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            message: message.into(),
        }
    }
}
