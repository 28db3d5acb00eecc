//! Lexer tests for Yeva.
//!
//! Covers: keywords, operators, number literals in every base, strings and
//! escapes, comments, logical line ends, indentation (indent, dedent, bad
//! dedent, mixed tabs and spaces), line continuation, and error recovery.

use yeva_lexer::{Lexer, ScanError, TokenKind};
use yeva_types::SourceFile;

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

/// Lex source text and return just the token kinds (excluding final Eof).
fn kinds(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.yv", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .filter(|t| t.kind != TokenKind::Eof)
        .map(|t| t.kind)
        .collect()
}

/// Lex and return all token kinds including Eof.
fn kinds_with_eof(source: &str) -> Vec<TokenKind> {
    let sf = SourceFile::new("test.yv", source);
    Lexer::new(&sf)
        .lex()
        .tokens
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

/// Lex and return the first error message.
fn first_error(source: &str) -> String {
    let sf = SourceFile::new("test.yv", source);
    Lexer::new(&sf)
        .lex()
        .errors
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_default()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

fn num(n: f64) -> TokenKind {
    TokenKind::Number(n)
}

// ─────────────────────────────────────────────────────────────────────
// Keywords & identifiers
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_statement_keywords() {
    let pairs = [
        ("def", TokenKind::Def),
        ("elif", TokenKind::Elif),
        ("except", TokenKind::Except),
        ("finally", TokenKind::Finally),
        ("lambda", TokenKind::Lambda),
        ("nonlocal", TokenKind::NonLocal),
        ("global", TokenKind::Global),
        ("local", TokenKind::Local),
        ("raise", TokenKind::Raise),
    ];
    for (src, expected) in &pairs {
        assert_eq!(kinds(src), vec![expected.clone()], "keyword '{src}'");
    }
}

#[test]
fn test_literal_keywords_end_lines() {
    assert_eq!(kinds("None"), vec![TokenKind::KwNone, TokenKind::Newline]);
    assert_eq!(kinds("True"), vec![TokenKind::True, TokenKind::Newline]);
    assert_eq!(kinds("False"), vec![TokenKind::False, TokenKind::Newline]);
    assert_eq!(kinds("pass"), vec![TokenKind::Pass, TokenKind::Newline]);
}

#[test]
fn test_identifiers() {
    assert_eq!(
        kinds("_tmp snake_case x1"),
        vec![ident("_tmp"), ident("snake_case"), ident("x1"), TokenKind::Newline]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Operators & punctuation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_all_operator_tokens() {
    assert_eq!(
        kinds("+ - * ** / = == != < <= > >= -> @ . , :"),
        vec![
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::StarStar,
            TokenKind::Slash,
            TokenKind::Eq,
            TokenKind::EqEq,
            TokenKind::BangEq,
            TokenKind::Less,
            TokenKind::LessEq,
            TokenKind::Greater,
            TokenKind::GreaterEq,
            TokenKind::Arrow,
            TokenKind::At,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Colon,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_arrow_versus_minus() {
    assert_eq!(
        kinds("a->b - c"),
        vec![
            ident("a"),
            TokenKind::Arrow,
            ident("b"),
            TokenKind::Minus,
            ident("c"),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_lone_bang_is_an_error() {
    assert_eq!(first_error("!x"), "unexpected character '!'");
}

// ─────────────────────────────────────────────────────────────────────
// Number literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_radix_integers() {
    assert_eq!(kinds("0x1F"), vec![num(31.0), TokenKind::Newline]);
    assert_eq!(kinds("0o17"), vec![num(15.0), TokenKind::Newline]);
    assert_eq!(kinds("0b101"), vec![num(5.0), TokenKind::Newline]);
    assert_eq!(kinds("0XfF"), vec![num(255.0), TokenKind::Newline]);
}

#[test]
fn test_decimal_literals() {
    assert_eq!(kinds("1_000.5"), vec![num(1000.5), TokenKind::Newline]);
    assert_eq!(kinds("3.25"), vec![num(3.25), TokenKind::Newline]);
    assert_eq!(kinds("0"), vec![num(0.0), TokenKind::Newline]);
    assert_eq!(kinds("1_2_3"), vec![num(123.0), TokenKind::Newline]);
}

#[test]
fn test_number_followed_by_dot_no_digit() {
    assert_eq!(kinds("1.x"), vec![num(1.0), TokenKind::Dot, ident("x"), TokenKind::Newline]);
}

#[test]
fn test_bad_underscores() {
    assert_eq!(first_error("1__0"), "double underscore in number literal");
    assert_eq!(first_error("1_"), "number literal ends with underscore");
    assert_eq!(first_error("1_.5"), "number literal ends with underscore");
}

#[test]
fn test_digits_outside_radix() {
    assert_eq!(first_error("0b102"), "invalid digit '2' in base 2 literal");
    assert_eq!(first_error("0o8"), "invalid digit '8' in base 8 literal");
    assert_eq!(first_error("0x1G"), "invalid digit 'G' in base 16 literal");
    assert_eq!(first_error("0x"), "missing digits in base 16 literal");
}

// ─────────────────────────────────────────────────────────────────────
// String literals
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_plain_string() {
    assert_eq!(
        kinds(r#""hello world""#),
        vec![TokenKind::String("hello world".into()), TokenKind::Newline]
    );
}

#[test]
fn test_string_escape_sequences() {
    assert_eq!(
        kinds(r#""a\nb\tc\\d\"e\rf\bg""#),
        vec![
            TokenKind::String("a\nb\tc\\d\"e\rf\u{8}g".into()),
            TokenKind::Newline
        ]
    );
}

#[test]
fn test_invalid_escape() {
    assert_eq!(first_error(r#""\q""#), "invalid escape '\\q'");
}

#[test]
fn test_unterminated_string() {
    assert_eq!(first_error("\"abc"), "unterminated string");
    assert_eq!(first_error("\"abc\\"), "unterminated string");
}

#[test]
fn test_multiline_string_advances_line() {
    let sf = SourceFile::new("test.yv", "\"a\nb\"\nx");
    let tokens = Lexer::new(&sf).lex().tokens;
    assert_eq!(tokens[0].kind, TokenKind::String("a\nb".into()));
    assert_eq!(tokens[0].line(), 1);
    assert_eq!(tokens[2].kind, ident("x"));
    assert_eq!(tokens[2].line(), 3);
}

// ─────────────────────────────────────────────────────────────────────
// Comments & logical lines
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_comment_stripped() {
    assert_eq!(
        kinds("x // trailing\n// whole line\ny"),
        vec![ident("x"), TokenKind::Newline, ident("y"), TokenKind::Newline]
    );
}

#[test]
fn test_slash_is_division() {
    assert_eq!(
        kinds("a / b"),
        vec![ident("a"), TokenKind::Slash, ident("b"), TokenKind::Newline]
    );
}

#[test]
fn test_operator_continues_line() {
    assert_eq!(
        kinds("x = 1 +\n        2\n"),
        vec![
            ident("x"),
            TokenKind::Eq,
            num(1.0),
            TokenKind::Plus,
            num(2.0),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_brackets_continue_line() {
    assert_eq!(
        kinds("f(1,\n  2\n)\n"),
        vec![
            ident("f"),
            TokenKind::LParen,
            num(1.0),
            TokenKind::Comma,
            num(2.0),
            TokenKind::RParen,
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_single_newline_for_blank_lines() {
    assert_eq!(
        kinds("a\n\n\n\nb"),
        vec![ident("a"), TokenKind::Newline, ident("b"), TokenKind::Newline]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Indentation
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_indent_and_dedent() {
    assert_eq!(
        kinds("if x:\n    y\nz"),
        vec![
            TokenKind::If,
            ident("x"),
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            ident("y"),
            TokenKind::Newline,
            TokenKind::Dedent,
            ident("z"),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_dedents_flushed_at_eof() {
    assert_eq!(
        kinds_with_eof("def f():\n    if x:\n        y"),
        vec![
            TokenKind::Def,
            ident("f"),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            TokenKind::If,
            ident("x"),
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            ident("y"),
            TokenKind::Newline,
            TokenKind::Dedent,
            TokenKind::Dedent,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_blank_and_comment_lines_ignore_indentation() {
    assert_eq!(
        kinds("if x:\n\n  // note\n    y\n"),
        vec![
            TokenKind::If,
            ident("x"),
            TokenKind::Colon,
            TokenKind::Newline,
            TokenKind::Indent,
            ident("y"),
            TokenKind::Newline,
            TokenKind::Dedent,
        ]
    );
}

#[test]
fn test_bad_dedent() {
    assert_eq!(first_error("if x:\n    y\n  z\n"), "bad dedent");
}

#[test]
fn test_mixed_tabs_and_spaces_in_one_run() {
    assert_eq!(first_error("if x:\n\t y\n"), "mixed tabs and spaces");
}

#[test]
fn test_mixed_styles_across_lines() {
    assert_eq!(
        first_error("if x:\n    y\nif z:\n\tw\n"),
        "mixed tabs and spaces"
    );
}

#[test]
fn test_tabs_alone_are_fine() {
    let sf = SourceFile::new("test.yv", "if x:\n\ty\n\tz\n");
    let result = Lexer::new(&sf).lex();
    assert!(!result.errors.has_errors());
}

// ─────────────────────────────────────────────────────────────────────
// Errors & recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unexpected_character_then_continue() {
    assert_eq!(
        kinds("$ x"),
        vec![
            TokenKind::Error(ScanError::UnexpectedCharacter('$')),
            ident("x"),
            TokenKind::Newline,
        ]
    );
}

#[test]
fn test_diagnostic_format() {
    let sf = SourceFile::new("test.yv", "a = 1\nb = $");
    let result = Lexer::new(&sf).lex();
    let err = result.errors.first().expect("expected an error");
    assert_eq!(err.to_string(), "line 2 at '$': unexpected character '$'");
    assert_eq!(err.source_line, "b = $");
}

#[test]
fn test_errors_are_collected() {
    let sf = SourceFile::new("test.yv", "$\n1__0\n\"open");
    let result = Lexer::new(&sf).lex();
    assert_eq!(result.errors.total_errors, 3);
}

#[test]
fn test_lazy_scanning_stops_where_asked() {
    // Only the first token is requested, so the later error is never seen.
    let sf = SourceFile::new("test.yv", "ok\n\"never closed");
    let mut lexer = Lexer::new(&sf);
    assert_eq!(lexer.next_token().kind, ident("ok"));
    assert_eq!(lexer.next_token().kind, TokenKind::Newline);
}
