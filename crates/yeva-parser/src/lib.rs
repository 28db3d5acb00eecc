//! Yeva parser: converts a token stream into an AST.

mod parse_expr;
mod parse_stmt;
mod parser;
mod scope;

pub use parser::{ParseResult, Parser};

use yeva_lexer::Lexer;
use yeva_types::SourceFile;

/// Scan and parse `source` in one step.
pub fn parse_source(name: &str, source: &str) -> ParseResult {
    let file = SourceFile::new(name, source);
    Parser::new(Lexer::new(&file)).parse()
}
