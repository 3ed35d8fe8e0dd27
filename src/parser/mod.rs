//! Parser for template markup and tag arguments

pub mod ast;
mod grammar;
pub mod lexer;
mod template;

pub use ast::*;
pub use grammar::{parse_expression, parse_tag};
pub use template::TemplateParser;
