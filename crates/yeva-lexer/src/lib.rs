//! Yeva lexer: converts indentation-structured source text into tokens.

pub mod error;
pub mod lexer;
pub mod token;

pub use error::ScanError;
pub use lexer::{LexResult, Lexer};
pub use token::{Token, TokenKind, ALL_KEYWORDS};
