//! Shared types for the Yeva interpreter.
//!
//! This crate defines the AST node types, source spans, compile-time
//! diagnostics, and the debug AST printer used by every stage.

mod error;
mod span;
pub mod ast;
pub mod printer;

pub use error::{CompileError, CompileErrors, ErrorCategory, ErrorCode, MAX_ERRORS};
pub use span::{SourceFile, Span};
