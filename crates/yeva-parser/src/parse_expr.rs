//! Expression parsing by precedence climbing.
//!
//! Precedence (lowest → highest):
//! 1. `or`
//! 2. `and`
//! 3. `==`, `!=`
//! 4. `<`, `<=`, `>`, `>=`
//! 5. `+`, `-`
//! 6. `*`, `/`, `**`
//! 7. unary `-`, `+`, `not`
//! 8. postfix: call `()`, index `[]`, `.name`, `->`, prototype dict `{}`
//!
//! All binary operators are left-associative.

use std::rc::Rc;

use yeva_lexer::TokenKind;
use yeva_types::ast::*;
use yeva_types::{ErrorCode, Span};

use crate::parser::Parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Or,
    And,
    Equality,
    Comparison,
    Term,
    Factor,
    Unary,
}

impl Precedence {
    fn next(self) -> Self {
        match self {
            Precedence::Or => Precedence::And,
            Precedence::And => Precedence::Equality,
            Precedence::Equality => Precedence::Comparison,
            Precedence::Comparison => Precedence::Term,
            Precedence::Term => Precedence::Factor,
            Precedence::Factor | Precedence::Unary => Precedence::Unary,
        }
    }
}

fn binary_op(kind: &TokenKind) -> Option<(BinOp, Precedence)> {
    let pair = match kind {
        TokenKind::Or => (BinOp::Or, Precedence::Or),
        TokenKind::And => (BinOp::And, Precedence::And),
        TokenKind::EqEq => (BinOp::Eq, Precedence::Equality),
        TokenKind::BangEq => (BinOp::NotEq, Precedence::Equality),
        TokenKind::Less => (BinOp::Less, Precedence::Comparison),
        TokenKind::LessEq => (BinOp::LessEq, Precedence::Comparison),
        TokenKind::Greater => (BinOp::Greater, Precedence::Comparison),
        TokenKind::GreaterEq => (BinOp::GreaterEq, Precedence::Comparison),
        TokenKind::Plus => (BinOp::Add, Precedence::Term),
        TokenKind::Minus => (BinOp::Sub, Precedence::Term),
        TokenKind::Star => (BinOp::Mul, Precedence::Factor),
        TokenKind::Slash => (BinOp::Div, Precedence::Factor),
        // `**` shares the factor level and groups left like the rest.
        TokenKind::StarStar => (BinOp::Pow, Precedence::Factor),
        _ => return None,
    };
    Some(pair)
}

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Entry Point
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_expression(&mut self) -> Option<Expr> {
        self.parse_precedence(Precedence::Or)
    }

    fn parse_precedence(&mut self, min: Precedence) -> Option<Expr> {
        let left = self.parse_unary()?;
        self.parse_infix(left, min)
    }

    /// Fold binary operators binding at least as tightly as `min` onto `left`.
    fn parse_infix(&mut self, mut left: Expr, min: Precedence) -> Option<Expr> {
        while let Some((op, prec)) = binary_op(self.peek_kind()) {
            if prec < min {
                break;
            }
            self.advance();
            let right = self.parse_precedence(prec.next())?;
            let span = left.span.merge(right.span);
            left = Expr::new(
                ExprKind::Binary {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                span,
            );
        }
        Some(left)
    }

    /// `UnaryExpr = ("-" | "+" | "not") UnaryExpr | "lambda" ... | PostfixExpr`
    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.peek().span;
        let op = match self.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Not => UnaryOp::Not,
            TokenKind::Lambda => return self.parse_lambda(),
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        self.advance();
        let operand = self.parse_unary()?;
        let span = start.merge(operand.span);
        Some(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Postfix
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_postfix(&mut self, mut expr: Expr) -> Option<Expr> {
        loop {
            expr = match self.peek_kind() {
                TokenKind::LParen => {
                    self.advance();
                    let args = self.parse_comma_list(&TokenKind::RParen)?;
                    let end = self.expect(&TokenKind::RParen)?.span;
                    let span = expr.span.merge(end);
                    Expr::new(
                        ExprKind::Call {
                            callee: Box::new(expr),
                            args,
                        },
                        span,
                    )
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    let end = self.expect(&TokenKind::RBracket)?.span;
                    let span = expr.span.merge(end);
                    Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    )
                }
                TokenKind::Dot => {
                    self.advance();
                    let key = self.parse_name_key()?;
                    let span = expr.span.merge(key.span);
                    Expr::new(
                        ExprKind::Index {
                            object: Box::new(expr),
                            index: Box::new(key),
                        },
                        span,
                    )
                }
                TokenKind::Arrow => {
                    self.advance();
                    let index = if self.eat(&TokenKind::LBracket) {
                        let index = self.parse_expression()?;
                        self.expect(&TokenKind::RBracket)?;
                        index
                    } else {
                        self.parse_name_key()?
                    };
                    let span = expr.span.merge(self.previous().span);
                    Expr::new(
                        ExprKind::Arrow {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    )
                }
                TokenKind::LBrace => {
                    let (entries, end) = self.parse_dict_body()?;
                    let span = expr.span.merge(end);
                    Expr::new(
                        ExprKind::ProtoDict {
                            proto: Box::new(expr),
                            entries,
                        },
                        span,
                    )
                }
                _ => return Some(expr),
            };
        }
    }

    /// An identifier after `.` or `->`, as a string key.
    fn parse_name_key(&mut self) -> Option<Expr> {
        let (name, span) = self.expect_identifier()?;
        Some(Expr::new(ExprKind::Str(name), span))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Primary Expressions
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.peek().span;
        let kind = match self.peek_kind().clone() {
            // ── Literals ────────────────────────────────────────────────
            TokenKind::Number(n) => ExprKind::Number(n),
            TokenKind::String(s) => ExprKind::Str(s),
            TokenKind::True => ExprKind::Bool(true),
            TokenKind::False => ExprKind::Bool(false),
            TokenKind::KwNone => ExprKind::None,
            TokenKind::Identifier(name) => ExprKind::Var(self.resolve(&name)),

            // ── Grouping & collections ──────────────────────────────────
            TokenKind::LParen => {
                self.advance();
                let mut inner = self.parse_expression()?;
                let end = self.expect(&TokenKind::RParen)?.span;
                inner.span = start.merge(end);
                return Some(inner);
            }
            TokenKind::LBracket => {
                self.advance();
                let items = self.parse_comma_list(&TokenKind::RBracket)?;
                let end = self.expect(&TokenKind::RBracket)?.span;
                return Some(Expr::new(ExprKind::List(items), start.merge(end)));
            }
            TokenKind::LBrace => {
                let (entries, end) = self.parse_dict_body()?;
                return Some(Expr::new(ExprKind::Dict(entries), start.merge(end)));
            }

            _ => {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected expression");
                return None;
            }
        };
        self.advance();
        Some(Expr::new(kind, start))
    }

    /// Expressions separated by commas up to `close` (not consumed).
    /// A trailing comma is allowed.
    fn parse_comma_list(&mut self, close: &TokenKind) -> Option<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.check_exact(close) {
            items.push(self.parse_expression()?);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(items)
    }

    /// `"{" [ entry { "," entry } [","] ] "}"`, returning the closing span.
    fn parse_dict_body(&mut self) -> Option<(Vec<DictEntry>, Span)> {
        self.expect(&TokenKind::LBrace)?;
        let mut entries = Vec::new();
        while !self.check_exact(&TokenKind::RBrace) {
            let key = self.parse_dict_key()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push(DictEntry { key, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBrace)?.span;
        Some((entries, end))
    }

    /// A bare identifier directly followed by `:` is a string key; any
    /// other key is an ordinary expression.
    fn parse_dict_key(&mut self) -> Option<Expr> {
        let TokenKind::Identifier(name) = self.peek_kind().clone() else {
            return self.parse_expression();
        };
        let span = self.advance().span;
        if self.check_exact(&TokenKind::Colon) {
            return Some(Expr::new(ExprKind::Str(name), span));
        }
        let var = Expr::new(ExprKind::Var(self.resolve(&name)), span);
        let operand = self.parse_postfix(var)?;
        self.parse_infix(operand, Precedence::Or)
    }

    /// `lambda a, b: expr`, a function whose body returns `expr`.
    fn parse_lambda(&mut self) -> Option<Expr> {
        let start = self.advance().span;
        let params = self.parse_params(&TokenKind::Colon)?;
        self.expect(&TokenKind::Colon)?;
        let result = self.with_function(&params, |p| p.parse_expression())?;
        let span = start.merge(result.span);
        let body = Block::new(
            vec![Stmt::new(StmtKind::Return(vec![result]), span)],
            span,
        );
        Some(Expr::new(
            ExprKind::Lambda(FuncDef {
                name: "lambda".to_string(),
                params,
                body: Rc::new(body),
            }),
            span,
        ))
    }
}
