//! Template compiler for the `{{ ... }}` view language

pub mod ast;
mod grammar;
pub mod lexer;

use std::rc::Rc;

pub use ast::*;
pub use grammar::parse;

/// Parse `source` into a shareable template
pub fn compile(source: &str) -> Result<Rc<Template>, Vec<crate::ParseError>> {
    parse(source).map(Rc::new)
}
