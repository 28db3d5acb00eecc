//! Core parser infrastructure: token cursor, error reporting, recovery.

use std::mem;

use yeva_lexer::{Lexer, Token, TokenKind};
use yeva_types::ast::{Program, Stmt, StmtKind};
use yeva_types::{CompileError, CompileErrors, ErrorCode, SourceFile, Span};

use crate::scope::Body;

/// The Yeva parser.
///
/// Pulls tokens lazily from a [`Lexer`], keeping one token of lookahead
/// (`current`) and the last consumed token (`previous`). Errors are
/// collected; a failing statement becomes a [`StmtKind::Bad`] node and the
/// parser resynchronizes at the next statement.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    source_file: &'src SourceFile,
    current: Token,
    previous: Token,
    /// Tokens consumed so far, used to guarantee progress during recovery.
    consumed: usize,
    errors: CompileErrors,
    /// Enclosing bodies, innermost last; the bottom one is the module.
    pub(crate) bodies: Vec<Body>,
}

/// Result of parsing: always a program, plus every diagnostic found.
pub struct ParseResult {
    pub program: Program,
    pub errors: CompileErrors,
}

impl ParseResult {
    /// The first diagnostic, which callers treat as the hard error.
    pub fn first_error(&self) -> Option<&CompileError> {
        self.errors.first()
    }

    pub fn into_result(self) -> Result<Program, CompileErrors> {
        if self.errors.has_errors() {
            Err(self.errors)
        } else {
            Ok(self.program)
        }
    }
}

impl<'src> Parser<'src> {
    pub fn new(lexer: Lexer<'src>) -> Self {
        let source_file = lexer.source_file();
        let placeholder = Token::new(TokenKind::Eof, Span::point(1, 1), "");
        let mut parser = Self {
            lexer,
            source_file,
            current: placeholder.clone(),
            previous: placeholder,
            consumed: 0,
            errors: CompileErrors::empty(),
            bodies: vec![Body::module()],
        };
        parser.advance();
        parser.consumed = 0;
        parser
    }

    // ── Token Cursor ──────────────────────────────────────────────────────────

    pub(crate) fn peek(&self) -> &Token {
        &self.current
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.current.kind
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.previous
    }

    /// Consume the current token and return it.
    ///
    /// Error tokens coming from the scanner are recorded as diagnostics and
    /// skipped here, so the grammar code never sees them.
    pub(crate) fn advance(&mut self) -> Token {
        let next = loop {
            let token = self.lexer.next_token();
            match &token.kind {
                TokenKind::Error(err) => {
                    let diagnostic = self.lexer.diagnostic(&token, err);
                    self.errors.push_error(diagnostic);
                }
                _ => break token,
            }
        };
        self.previous = mem::replace(&mut self.current, next);
        self.consumed += 1;
        self.previous.clone()
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn check_exact(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// If the current token matches, advance and return `true`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check_exact(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Expect Helpers ────────────────────────────────────────────────────────

    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Option<Token> {
        if self.check_exact(expected) {
            Some(self.advance())
        } else {
            self.error_at_current(
                ErrorCode::UNEXPECTED_TOKEN,
                format!("expected '{expected}'"),
            );
            None
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Option<(String, Span)> {
        if let TokenKind::Identifier(name) = self.peek_kind() {
            let name = name.clone();
            let span = self.advance().span;
            Some((name, span))
        } else {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected identifier");
            None
        }
    }

    /// End of a simple statement.
    pub(crate) fn expect_line_end(&mut self) -> Option<()> {
        if self.eat(&TokenKind::Newline) || self.at_end() {
            Some(())
        } else {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected end of line");
            None
        }
    }

    // ── Error Reporting ───────────────────────────────────────────────────────

    pub(crate) fn error_at_current(&mut self, code: ErrorCode, message: impl Into<String>) {
        let token = self.current.clone();
        self.error_at(&token, code, message);
    }

    pub(crate) fn error_at_previous(&mut self, code: ErrorCode, message: impl Into<String>) {
        let token = self.previous.clone();
        self.error_at(&token, code, message);
    }

    pub(crate) fn error_at(&mut self, token: &Token, code: ErrorCode, message: impl Into<String>) {
        let source_line = self.source_file.line(token.line()).unwrap_or("");
        let error = CompileError::new(
            &self.source_file.name,
            code,
            message,
            token.span,
            token.lexeme(),
            source_line,
        );
        self.errors.push_error(error);
    }

    // ── Synchronization ───────────────────────────────────────────────────────

    /// Skip tokens until just after a `Newline` or in front of a token that
    /// starts a statement or closes a block.
    pub(crate) fn synchronize(&mut self) {
        while !self.at_end() {
            if self.previous.kind == TokenKind::Newline {
                return;
            }
            match self.peek_kind() {
                TokenKind::Def
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Try
                | TokenKind::Raise
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Except
                | TokenKind::Finally
                | TokenKind::Local
                | TokenKind::NonLocal
                | TokenKind::Global
                | TokenKind::At
                | TokenKind::Dedent => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Parse one statement, turning a failure into a [`StmtKind::Bad`] node.
    ///
    /// Returns `None` for statements that produce no node (`pass`).
    pub(crate) fn declaration(&mut self) -> Option<Stmt> {
        let start = self.consumed;
        let span = self.peek().span;
        let errors_before = self.errors.total_errors;
        let parsed = if self.eat(&TokenKind::Pass) {
            match self.expect_line_end() {
                Some(()) => return None,
                None => None,
            }
        } else {
            self.parse_statement()
        };
        match parsed {
            Some(stmt) => Some(stmt),
            None => {
                if self.consumed == start && !self.at_end() {
                    self.advance();
                }
                self.synchronize();
                let message = self
                    .errors
                    .errors
                    .get(errors_before)
                    .map(|e| e.message.clone())
                    .unwrap_or_else(|| "invalid statement".to_string());
                Some(Stmt::new(StmtKind::Bad(message), span))
            }
        }
    }

    // ── Public API ────────────────────────────────────────────────────────────

    /// Parse the whole token stream into a [`Program`].
    pub fn parse(mut self) -> ParseResult {
        let mut stmts = Vec::new();
        while !self.at_end() {
            if self.eat(&TokenKind::Newline) || self.eat(&TokenKind::Dedent) {
                continue;
            }
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        tracing::debug!(
            file = %self.source_file.name,
            statements = stmts.len(),
            errors = self.errors.total_errors,
            "parsed program"
        );
        ParseResult {
            program: Program { stmts },
            errors: self.errors,
        }
    }
}
