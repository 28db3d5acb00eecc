//! Token types for the Yeva lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the language plus the
//! structural `Newline`/`Indent`/`Dedent` markers, and [`Token`], which
//! pairs a kind with its [`Span`] and raw source text.

use std::fmt;
use yeva_types::Span;

use crate::error::ScanError;

/// All reserved words. None of them can be used as a variable name.
pub const ALL_KEYWORDS: &[&str] = &[
    // Statements (17)
    "def", "if", "elif", "else", "while", "for", "in", "break", "continue", "return", "raise",
    "try", "except", "finally", "as", "pass", "lambda",
    // Scope directives (3)
    "local", "nonlocal", "global",
    // Operators and literals (6)
    "and", "or", "not", "None", "True", "False",
];

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// Raw source text; empty for `Newline`, `Indent`, `Dedent` and `Eof`.
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, literal: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            literal: literal.into(),
        }
    }

    pub fn line(&self) -> u32 {
        self.span.start_line
    }

    /// The text diagnostics quote for this token: its source text, or the
    /// kind's name for tokens without one.
    pub fn lexeme(&self) -> String {
        if self.literal.is_empty() {
            self.kind.to_string()
        } else {
            self.literal.clone()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ── Literals ──
    Number(f64),
    String(String),
    Identifier(String),
    KwNone,
    True,
    False,

    // ── Keywords ──
    And,
    As,
    Break,
    Continue,
    Def,
    Elif,
    Else,
    Except,
    Finally,
    For,
    Global,
    If,
    In,
    Lambda,
    Local,
    NonLocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,

    // ── Operators ──
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Eq,
    EqEq,
    BangEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Arrow,

    // ── Punctuation ──
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Dot,
    Colon,
    At,

    // ── Structure ──
    Newline,
    Indent,
    Dedent,
    Error(ScanError),
    Eof,
}

impl TokenKind {
    /// Look up a reserved word. `None` for user identifiers.
    pub fn from_keyword(s: &str) -> Option<TokenKind> {
        Some(match s {
            "and" => TokenKind::And,
            "as" => TokenKind::As,
            "break" => TokenKind::Break,
            "continue" => TokenKind::Continue,
            "def" => TokenKind::Def,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "except" => TokenKind::Except,
            "False" => TokenKind::False,
            "finally" => TokenKind::Finally,
            "for" => TokenKind::For,
            "global" => TokenKind::Global,
            "if" => TokenKind::If,
            "in" => TokenKind::In,
            "lambda" => TokenKind::Lambda,
            "local" => TokenKind::Local,
            "None" => TokenKind::KwNone,
            "nonlocal" => TokenKind::NonLocal,
            "not" => TokenKind::Not,
            "or" => TokenKind::Or,
            "pass" => TokenKind::Pass,
            "raise" => TokenKind::Raise,
            "return" => TokenKind::Return,
            "True" => TokenKind::True,
            "try" => TokenKind::Try,
            "while" => TokenKind::While,
            _ => return None,
        })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwNone
                | TokenKind::True
                | TokenKind::False
                | TokenKind::And
                | TokenKind::As
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Def
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::Except
                | TokenKind::Finally
                | TokenKind::For
                | TokenKind::Global
                | TokenKind::If
                | TokenKind::In
                | TokenKind::Lambda
                | TokenKind::Local
                | TokenKind::NonLocal
                | TokenKind::Not
                | TokenKind::Or
                | TokenKind::Pass
                | TokenKind::Raise
                | TokenKind::Return
                | TokenKind::Try
                | TokenKind::While
        )
    }

    /// Whether a logical line may end right after this token.
    ///
    /// A line break after any other token (an operator, a comma, an opening
    /// bracket) continues the statement on the next physical line.
    pub fn can_end_line(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::Number(_)
                | TokenKind::String(_)
                | TokenKind::KwNone
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::Return
                | TokenKind::Pass
                | TokenKind::RParen
                | TokenKind::RBracket
                | TokenKind::RBrace
                | TokenKind::Colon
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(_) => f.write_str("number"),
            TokenKind::String(_) => f.write_str("string"),
            TokenKind::Identifier(_) => f.write_str("identifier"),
            TokenKind::KwNone => f.write_str("None"),
            TokenKind::True => f.write_str("True"),
            TokenKind::False => f.write_str("False"),
            TokenKind::And => f.write_str("and"),
            TokenKind::As => f.write_str("as"),
            TokenKind::Break => f.write_str("break"),
            TokenKind::Continue => f.write_str("continue"),
            TokenKind::Def => f.write_str("def"),
            TokenKind::Elif => f.write_str("elif"),
            TokenKind::Else => f.write_str("else"),
            TokenKind::Except => f.write_str("except"),
            TokenKind::Finally => f.write_str("finally"),
            TokenKind::For => f.write_str("for"),
            TokenKind::Global => f.write_str("global"),
            TokenKind::If => f.write_str("if"),
            TokenKind::In => f.write_str("in"),
            TokenKind::Lambda => f.write_str("lambda"),
            TokenKind::Local => f.write_str("local"),
            TokenKind::NonLocal => f.write_str("nonlocal"),
            TokenKind::Not => f.write_str("not"),
            TokenKind::Or => f.write_str("or"),
            TokenKind::Pass => f.write_str("pass"),
            TokenKind::Raise => f.write_str("raise"),
            TokenKind::Return => f.write_str("return"),
            TokenKind::Try => f.write_str("try"),
            TokenKind::While => f.write_str("while"),
            TokenKind::Plus => f.write_str("+"),
            TokenKind::Minus => f.write_str("-"),
            TokenKind::Star => f.write_str("*"),
            TokenKind::StarStar => f.write_str("**"),
            TokenKind::Slash => f.write_str("/"),
            TokenKind::Eq => f.write_str("="),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::BangEq => f.write_str("!="),
            TokenKind::Less => f.write_str("<"),
            TokenKind::LessEq => f.write_str("<="),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::GreaterEq => f.write_str(">="),
            TokenKind::Arrow => f.write_str("->"),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::LBracket => f.write_str("["),
            TokenKind::RBracket => f.write_str("]"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Dot => f.write_str("."),
            TokenKind::Colon => f.write_str(":"),
            TokenKind::At => f.write_str("@"),
            TokenKind::Newline => f.write_str("new line"),
            TokenKind::Indent => f.write_str("indent"),
            TokenKind::Dedent => f.write_str("dedent"),
            TokenKind::Error(_) => f.write_str("error"),
            TokenKind::Eof => f.write_str("end of file"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
