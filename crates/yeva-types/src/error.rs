use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Maximum number of diagnostics stored before the rest are only counted.
pub const MAX_ERRORS: usize = 20;

/// Diagnostic category, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Malformed characters, literals or indentation.
    Scan,
    /// Token sequences the grammar does not accept.
    Syntax,
    /// Well-formed statements used where they are not allowed.
    Context,
}

/// Numeric error code (E100–E399).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Scan errors (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const INVALID_ESCAPE: Self = Self(102);
    pub const INVALID_NUMBER: Self = Self(103);
    pub const BAD_DEDENT: Self = Self(104);
    pub const MIXED_INDENTATION: Self = Self(105);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const INVALID_ASSIGN_TARGET: Self = Self(201);
    pub const MISSING_HANDLER: Self = Self(202);

    // ── Context errors (E300–E399) ──
    pub const RETURN_OUTSIDE_FUNCTION: Self = Self(300);
    pub const LOOP_CONTROL_OUTSIDE_LOOP: Self = Self(301);
    pub const DECLARATION_OUTSIDE_FUNCTION: Self = Self(302);
    pub const DECLARATION_AFTER_USE: Self = Self(303);
    pub const CONFLICTING_DECLARATION: Self = Self(304);

    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Scan,
            300..=399 => ErrorCategory::Context,
            _ => ErrorCategory::Syntax,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan => write!(f, "scan"),
            Self::Syntax => write!(f, "syntax"),
            Self::Context => write!(f, "context"),
        }
    }
}

/// A single scanner or parser diagnostic.
///
/// `Display` renders the user-facing form `line <n> at '<lexeme>': <message>`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("line {} at '{}': {}", .span.start_line, .lexeme, .message)]
pub struct CompileError {
    /// Script name.
    pub file: String,
    pub code: ErrorCode,
    /// Derived from `code`.
    pub category: ErrorCategory,
    pub message: String,
    #[serde(flatten)]
    pub span: Span,
    /// Source text of the offending token, or its name for structural tokens.
    pub lexeme: String,
    /// The full source line, for context.
    pub source_line: String,
}

impl CompileError {
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        lexeme: impl Into<String>,
        source_line: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
            lexeme: lexeme.into(),
            source_line: source_line.into(),
        }
    }

    pub fn line(&self) -> u32 {
        self.span.start_line
    }
}

/// Every diagnostic produced while compiling one script.
///
/// The first entry is the hard error surfaced to callers; the rest exist so
/// tooling and tests can see all independent problems in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompileErrors {
    pub errors: Vec<CompileError>,
    pub total_errors: usize,
}

impl CompileErrors {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    /// Add an error, respecting the [`MAX_ERRORS`] limit.
    pub fn push_error(&mut self, error: CompileError) {
        if self.errors.len() < MAX_ERRORS {
            self.errors.push(error);
        }
        self.total_errors += 1;
    }

    pub fn first(&self) -> Option<&CompileError> {
        self.errors.first()
    }

    /// Append all diagnostics of `other` after the current ones.
    pub fn extend(&mut self, other: CompileErrors) {
        let dropped = other.total_errors - other.errors.len();
        for error in other.errors {
            self.push_error(error);
        }
        self.total_errors += dropped;
    }

    /// Machine-readable form for editors and test harnesses.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CompileErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
