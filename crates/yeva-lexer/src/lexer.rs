//! Core Yeva lexer: converts source text to tokens, one at a time.
//!
//! Features:
//! - Indentation tracking with an explicit level stack (`Indent`/`Dedent`)
//! - Logical line ends (`Newline`) only after tokens that can end a statement
//! - Line continuation after operators and inside brackets
//! - Single-line comments stripped (`//`)
//! - `0x`/`0o`/`0b` integers, decimal floats with `_` separators
//! - Errors reported in-band as [`TokenKind::Error`] tokens

use yeva_types::{CompileError, CompileErrors, SourceFile, Span};

use crate::error::ScanError;
use crate::token::{Token, TokenKind};

/// Longest error-token text quoted in diagnostics.
const MAX_ERROR_LITERAL: usize = 32;

/// Which character a line's leading whitespace used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndentStyle {
    Spaces,
    Tabs,
}

/// Leading whitespace of the line the cursor moved onto.
#[derive(Debug, Clone, Copy, Default)]
struct LeadingRun {
    width: usize,
    spaces: bool,
    tabs: bool,
}

/// The Yeva lexer.
///
/// Stateful and lazy: each [`next_token`](Lexer::next_token) call scans just
/// enough input for one token. Once `Eof` is produced every later call
/// returns `Eof` again.
pub struct Lexer<'src> {
    source: &'src str,
    source_file: &'src SourceFile,
    /// Current byte offset into `source`.
    pos: usize,
    /// Current line number (1-based).
    line: u32,
    /// Current column number (1-based).
    col: u32,
    /// Open indentation levels; the bottom entry is always 0.
    indents: Vec<usize>,
    /// Indentation width of the current logical line.
    cur_indent: usize,
    /// Indentation measured on a new line, applied once its `Newline` is out.
    pending_indent: Option<LeadingRun>,
    /// Style fixed by the first indented line of the session.
    indent_style: Option<IndentStyle>,
    /// The previous token may end a logical line.
    line_open: bool,
    /// No token of the current logical line has been produced yet.
    at_line_start: bool,
    /// Open `(`, `[` and `{` count; line breaks inside are ignored.
    bracket_depth: u32,
    finished: bool,
}

/// Result of lexing a whole file: tokens + any errors collected.
pub struct LexResult {
    /// The token stream (always ends with [`TokenKind::Eof`]).
    pub tokens: Vec<Token>,
    pub errors: CompileErrors,
}

impl<'src> Lexer<'src> {
    pub fn new(source_file: &'src SourceFile) -> Self {
        Self {
            source: &source_file.source,
            source_file,
            pos: 0,
            line: 1,
            col: 1,
            indents: vec![0],
            cur_indent: 0,
            pending_indent: None,
            indent_style: None,
            line_open: false,
            at_line_start: true,
            bracket_depth: 0,
            finished: false,
        }
    }

    pub fn source_file(&self) -> &'src SourceFile {
        self.source_file
    }

    /// Scan and return the next token.
    pub fn next_token(&mut self) -> Token {
        let token = self.scan_token();
        tracing::trace!(line = token.line(), kind = %token.kind, literal = %token.literal, "token");
        token
    }

    /// Lex the entire source file, collecting scan errors as diagnostics.
    pub fn lex(mut self) -> LexResult {
        let mut tokens = Vec::new();
        let mut errors = CompileErrors::empty();
        loop {
            let token = self.next_token();
            if let TokenKind::Error(err) = &token.kind {
                errors.push_error(self.diagnostic(&token, err));
            }
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        LexResult { tokens, errors }
    }

    /// Convert an error token into a diagnostic.
    pub fn diagnostic(&self, token: &Token, err: &ScanError) -> CompileError {
        CompileError::new(
            &self.source_file.name,
            err.code(),
            err.to_string(),
            token.span,
            token.lexeme(),
            self.source_file.line(token.line()).unwrap_or(""),
        )
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current_span(&self) -> Span {
        Span::point(self.line, self.col)
    }

    fn span_from(&self, start_line: u32, start_col: u32) -> Span {
        Span::new(
            start_line,
            start_col,
            self.line,
            self.col.saturating_sub(1).max(1),
        )
    }

    fn structural(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.current_span(), "")
    }

    // ─────────────────────────────────────────────────────────────
    // Whitespace, comments & indentation
    // ─────────────────────────────────────────────────────────────

    /// Skip blanks, comments and line breaks.
    ///
    /// Returns the leading whitespace of the last line entered, or `None`
    /// when no line break was crossed.
    fn skip_trivia(&mut self) -> Option<LeadingRun> {
        let mut run = LeadingRun::default();
        let mut crossed = false;
        while let Some(ch) = self.peek() {
            match ch {
                b' ' => {
                    run.width += 1;
                    run.spaces = true;
                    self.advance();
                }
                b'\t' => {
                    run.width += 1;
                    run.tabs = true;
                    self.advance();
                }
                b'\r' => {
                    self.advance();
                }
                b'\n' => {
                    crossed = true;
                    run = LeadingRun::default();
                    self.advance();
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    while self.peek().is_some_and(|c| c != b'\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        crossed.then_some(run)
    }

    /// Validate and adopt the indentation of a new logical line.
    fn apply_indent(&mut self, run: LeadingRun) -> Result<(), ScanError> {
        if run.width > 0 {
            let style = match (run.spaces, run.tabs) {
                (true, true) => return Err(ScanError::MixedIndentation),
                (false, true) => IndentStyle::Tabs,
                _ => IndentStyle::Spaces,
            };
            match self.indent_style {
                Some(existing) if existing != style => return Err(ScanError::MixedIndentation),
                Some(_) => {}
                None => self.indent_style = Some(style),
            }
        }
        self.cur_indent = run.width;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Token dispatch
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Token {
        if self.finished {
            return self.structural(TokenKind::Eof);
        }

        let crossed = self.skip_trivia();
        if let Some(run) = crossed {
            if self.bracket_depth == 0 && (self.line_open || self.at_line_start) {
                self.pending_indent = Some(run);
            }
        }

        if self.line_open && self.bracket_depth == 0 && (crossed.is_some() || self.at_end()) {
            self.line_open = false;
            self.at_line_start = true;
            return self.structural(TokenKind::Newline);
        }

        if let Some(run) = self.pending_indent.take() {
            if let Err(err) = self.apply_indent(run) {
                let span = self.current_span();
                let literal = self.error_literal(self.pos);
                return Token::new(TokenKind::Error(err), span, literal);
            }
        }
        if self.at_end() {
            self.cur_indent = 0;
        }

        let top = self.indents.last().copied().unwrap_or(0);
        if self.cur_indent < top {
            self.indents.pop();
            let below = self.indents.last().copied().unwrap_or(0);
            if self.cur_indent > below {
                // Treat the stray width as a level of its own so the rest of
                // the block keeps parsing.
                self.indents.push(self.cur_indent);
                return self.structural(TokenKind::Error(ScanError::BadDedent));
            }
            return self.structural(TokenKind::Dedent);
        }
        if self.cur_indent > top {
            self.indents.push(self.cur_indent);
            return self.structural(TokenKind::Indent);
        }

        if self.at_end() {
            self.finished = true;
            return self.structural(TokenKind::Eof);
        }

        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.col;
        let kind = self.scan_lexeme();
        let span = self.span_from(start_line, start_col);

        let literal = if matches!(kind, TokenKind::Error(_)) {
            self.error_literal(start_pos)
        } else {
            self.source[start_pos..self.pos].to_string()
        };
        if !matches!(kind, TokenKind::Error(_)) {
            self.line_open = kind.can_end_line();
            self.at_line_start = false;
        }
        Token::new(kind, span, literal)
    }

    /// Source text quoted for an error token: first line only, shortened.
    fn error_literal(&self, start: usize) -> String {
        let end = self.pos.max(start + 1).min(self.source.len());
        let text = self.source.get(start..end).unwrap_or("");
        let first_line = text.lines().next().unwrap_or("");
        if first_line.chars().count() > MAX_ERROR_LITERAL {
            let short: String = first_line.chars().take(MAX_ERROR_LITERAL).collect();
            format!("{short}...")
        } else {
            first_line.to_string()
        }
    }

    fn scan_lexeme(&mut self) -> TokenKind {
        let Some(ch) = self.peek() else {
            return TokenKind::Eof;
        };
        match ch {
            b'"' => return self.scan_string(),
            b'0'..=b'9' => return self.scan_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => return self.scan_identifier(),
            _ => {}
        }

        self.advance();
        match ch {
            b'(' => self.open_bracket(TokenKind::LParen),
            b'[' => self.open_bracket(TokenKind::LBracket),
            b'{' => self.open_bracket(TokenKind::LBrace),
            b')' => self.close_bracket(TokenKind::RParen),
            b']' => self.close_bracket(TokenKind::RBracket),
            b'}' => self.close_bracket(TokenKind::RBrace),
            b',' => TokenKind::Comma,
            b'.' => TokenKind::Dot,
            b':' => TokenKind::Colon,
            b'@' => TokenKind::At,
            b'+' => TokenKind::Plus,
            b'/' => TokenKind::Slash,
            b'-' => self.pick(b'>', TokenKind::Arrow, TokenKind::Minus),
            b'*' => self.pick(b'*', TokenKind::StarStar, TokenKind::Star),
            b'=' => self.pick(b'=', TokenKind::EqEq, TokenKind::Eq),
            b'<' => self.pick(b'=', TokenKind::LessEq, TokenKind::Less),
            b'>' => self.pick(b'=', TokenKind::GreaterEq, TokenKind::Greater),
            b'!' => self.pick(
                b'=',
                TokenKind::BangEq,
                TokenKind::Error(ScanError::UnexpectedCharacter('!')),
            ),
            _ => {
                // Step back over the byte and consume the whole character.
                self.pos -= 1;
                self.col -= 1;
                let c = self.source[self.pos..].chars().next().unwrap_or('?');
                for _ in 0..c.len_utf8() {
                    self.advance();
                }
                TokenKind::Error(ScanError::UnexpectedCharacter(c))
            }
        }
    }

    /// Two-character operator if the next byte is `second`, else `single`.
    fn pick(&mut self, second: u8, double: TokenKind, single: TokenKind) -> TokenKind {
        if self.peek() == Some(second) {
            self.advance();
            double
        } else {
            single
        }
    }

    fn open_bracket(&mut self, kind: TokenKind) -> TokenKind {
        self.bracket_depth += 1;
        kind
    }

    fn close_bracket(&mut self, kind: TokenKind) -> TokenKind {
        self.bracket_depth = self.bracket_depth.saturating_sub(1);
        kind
    }

    // ─────────────────────────────────────────────────────────────
    // Number literals
    // ─────────────────────────────────────────────────────────────

    fn scan_number(&mut self) -> TokenKind {
        if self.peek() == Some(b'0') {
            let radix = match self.peek_at(1).map(|c| c.to_ascii_lowercase()) {
                Some(b'x') => Some(16),
                Some(b'o') => Some(8),
                Some(b'b') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                return self.scan_radix_integer(radix);
            }
        }
        self.scan_float()
    }

    fn scan_radix_integer(&mut self, radix: u32) -> TokenKind {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphanumeric()) {
            self.advance();
        }
        let digits = &self.source[start..self.pos];
        if digits.is_empty() {
            return TokenKind::Error(ScanError::MissingDigits(radix));
        }
        if let Some(digit) = digits.chars().find(|c| !c.is_digit(radix)) {
            return TokenKind::Error(ScanError::InvalidDigit { digit, radix });
        }
        match u64::from_str_radix(digits, radix) {
            Ok(value) => TokenKind::Number(value as f64),
            Err(_) => TokenKind::Error(ScanError::IntegerOverflow),
        }
    }

    /// Decimal literal with at most one fractional part. `_` may separate
    /// digits but never doubles up or ends the literal.
    fn scan_float(&mut self) -> TokenKind {
        let mut text = String::new();
        let mut error = None;
        let mut after_underscore = false;
        let mut seen_dot = false;
        loop {
            match self.peek() {
                Some(c @ b'0'..=b'9') => {
                    text.push(c as char);
                    after_underscore = false;
                }
                Some(b'_') => {
                    if after_underscore {
                        error.get_or_insert(ScanError::DoubleUnderscore);
                    }
                    after_underscore = true;
                }
                Some(b'.')
                    if !seen_dot
                        && !after_underscore
                        && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) =>
                {
                    text.push('.');
                    seen_dot = true;
                }
                _ => break,
            }
            self.advance();
        }
        if after_underscore {
            error.get_or_insert(ScanError::TrailingUnderscore);
        }
        match error {
            Some(err) => TokenKind::Error(err),
            None => TokenKind::Number(text.parse().unwrap_or(0.0)),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // String literals
    // ─────────────────────────────────────────────────────────────

    fn scan_string(&mut self) -> TokenKind {
        self.advance(); // opening quote
        let mut bytes = Vec::new();
        let mut error = None;
        loop {
            match self.advance() {
                None => return TokenKind::Error(ScanError::UnterminatedString),
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    None => return TokenKind::Error(ScanError::UnterminatedString),
                    Some(b'n') => bytes.push(b'\n'),
                    Some(b'r') => bytes.push(b'\r'),
                    Some(b't') => bytes.push(b'\t'),
                    Some(b'b') => bytes.push(0x08),
                    Some(b'\\') => bytes.push(b'\\'),
                    Some(b'"') => bytes.push(b'"'),
                    Some(other) => {
                        error.get_or_insert(ScanError::InvalidEscape(other as char));
                    }
                },
                Some(c) => bytes.push(c),
            }
        }
        match error {
            Some(err) => TokenKind::Error(err),
            None => TokenKind::String(String::from_utf8_lossy(&bytes).into_owned()),
        }
    }

    // ─────────────────────────────────────────────────────────────
    // Identifiers & keywords
    // ─────────────────────────────────────────────────────────────

    fn scan_identifier(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == b'_')
        {
            self.advance();
        }
        let text = &self.source[start..self.pos];
        TokenKind::from_keyword(text).unwrap_or_else(|| TokenKind::Identifier(text.to_string()))
    }
}
