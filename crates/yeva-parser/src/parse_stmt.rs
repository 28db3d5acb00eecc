//! Statement and block parsing.
//!
//! Statement dispatch is a keyword switch; anything else is an expression
//! statement, which turns into an assignment when `,` or `=` follows the
//! first expression.

use std::rc::Rc;

use yeva_lexer::TokenKind;
use yeva_types::ast::*;
use yeva_types::{ErrorCode, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    // ══════════════════════════════════════════════════════════════════════════
    // Dispatch
    // ══════════════════════════════════════════════════════════════════════════

    pub(crate) fn parse_statement(&mut self) -> Option<Stmt> {
        match self.peek_kind() {
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Def => self.parse_def(Vec::new()),
            TokenKind::At => self.parse_decorated(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Raise => self.parse_raise(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break | TokenKind::Continue => self.parse_loop_control(),
            TokenKind::Local => self.parse_decl(ScopeKind::Local),
            TokenKind::NonLocal => self.parse_decl(ScopeKind::NonLocal),
            TokenKind::Global => self.parse_decl(ScopeKind::Global),
            TokenKind::Indent => {
                self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "unexpected indent");
                None
            }
            _ => self.parse_expr_stmt(),
        }
    }

    /// `":" NEWLINE INDENT statement+ DEDENT`
    pub(crate) fn parse_block(&mut self) -> Option<Block> {
        let start = self.expect(&TokenKind::Colon)?.span;
        self.expect(&TokenKind::Newline)?;
        if !self.eat(&TokenKind::Indent) {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected an indented block");
            return None;
        }
        let mut stmts = Vec::new();
        while !self.check_exact(&TokenKind::Dedent) && !self.at_end() {
            if self.eat(&TokenKind::Newline) {
                continue;
            }
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        let end = self.peek().span;
        self.eat(&TokenKind::Dedent);
        Some(Block::new(stmts, start.merge(end)))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Compound statements
    // ══════════════════════════════════════════════════════════════════════════

    /// `if cond: block (elif cond: block)* (else: block)?`
    fn parse_if(&mut self) -> Option<Stmt> {
        let start = self.advance().span; // `if` or `elif`
        let cond = self.parse_expression()?;
        let then_block = self.parse_block()?;
        let else_block = if self.check_exact(&TokenKind::Elif) {
            let nested = self.parse_if()?;
            let span = nested.span;
            Block::new(vec![nested], span)
        } else if self.eat(&TokenKind::Else) {
            self.parse_block()?
        } else {
            Block::new(Vec::new(), Span::point(then_block.span.end_line, 1))
        };
        let span = start.merge(then_block.span).merge(else_block.span);
        Some(Stmt::new(
            StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            span,
        ))
    }

    fn parse_while(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let cond = self.parse_expression()?;
        let body = self.with_loop(|p| p.parse_block())?;
        let span = start.merge(body.span);
        Some(Stmt::new(StmtKind::While { cond, body }, span))
    }

    /// `for a, b in iterable: block`
    fn parse_for(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let mut vars = Vec::new();
        loop {
            let (name, _) = self.expect_identifier()?;
            vars.push(self.resolve(&name));
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::In)?;
        let iterable = self.parse_expression()?;
        let body = self.with_loop(|p| p.parse_block())?;
        let span = start.merge(body.span);
        Some(Stmt::new(
            StmtKind::For {
                vars,
                iterable,
                body,
            },
            span,
        ))
    }

    /// `def name(params): block`, after any decorators.
    fn parse_def(&mut self, decorators: Vec<Expr>) -> Option<Stmt> {
        let start = self.expect(&TokenKind::Def)?.span;
        let (name, _) = self.expect_identifier()?;
        let target = self.resolve(&name);
        self.expect(&TokenKind::LParen)?;
        let params = self.parse_params(&TokenKind::RParen)?;
        self.expect(&TokenKind::RParen)?;
        let body = self.with_function(&params, |p| p.parse_block())?;
        let span = start.merge(body.span);
        Some(Stmt::new(
            StmtKind::Def {
                decorators,
                target,
                func: FuncDef {
                    name,
                    params,
                    body: Rc::new(body),
                },
            },
            span,
        ))
    }

    /// Parameter names up to (not including) `close`, trailing comma allowed.
    pub(crate) fn parse_params(&mut self, close: &TokenKind) -> Option<Vec<String>> {
        let mut params = Vec::new();
        while !self.check_exact(close) {
            let (name, _) = self.expect_identifier()?;
            params.push(name);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        Some(params)
    }

    /// `@expr NEWLINE` lines followed by a `def`.
    fn parse_decorated(&mut self) -> Option<Stmt> {
        let mut decorators = Vec::new();
        while self.eat(&TokenKind::At) {
            decorators.push(self.parse_expression()?);
            self.expect(&TokenKind::Newline)?;
        }
        if !self.check_exact(&TokenKind::Def) {
            self.error_at_current(ErrorCode::UNEXPECTED_TOKEN, "expected 'def' after decorator");
            return None;
        }
        self.parse_def(decorators)
    }

    /// `try: block [except [as name]: block] [finally: block]`
    fn parse_try(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let body = self.parse_block()?;
        let mut span = start.merge(body.span);

        let handler = if self.eat(&TokenKind::Except) {
            let binding = if self.eat(&TokenKind::As) {
                let (name, _) = self.expect_identifier()?;
                Some(self.resolve(&name))
            } else {
                None
            };
            let body = self.parse_block()?;
            span = span.merge(body.span);
            Some(ExceptClause { binding, body })
        } else {
            None
        };

        let finally = if self.eat(&TokenKind::Finally) {
            let block = self.parse_block()?;
            span = span.merge(block.span);
            Some(block)
        } else {
            None
        };

        if handler.is_none() && finally.is_none() {
            self.error_at_current(ErrorCode::MISSING_HANDLER, "expected 'except' or 'finally'");
            return None;
        }
        Some(Stmt::new(
            StmtKind::Try(TryStmt {
                body,
                handler,
                finally,
            }),
            span,
        ))
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Simple statements
    // ══════════════════════════════════════════════════════════════════════════

    fn parse_raise(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        let payload = self.parse_expression()?;
        self.expect_line_end()?;
        let span = start.merge(payload.span);
        Some(Stmt::new(StmtKind::Raise(payload), span))
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        let start = self.advance().span;
        if !self.in_function() {
            self.error_at_previous(ErrorCode::RETURN_OUTSIDE_FUNCTION, "'return' outside function");
            return None;
        }
        let values = if self.check_exact(&TokenKind::Newline) || self.at_end() {
            Vec::new()
        } else {
            self.parse_expr_list()?
        };
        self.expect_line_end()?;
        let span = values.iter().fold(start, |span, v| span.merge(v.span));
        Some(Stmt::new(StmtKind::Return(values), span))
    }

    fn parse_loop_control(&mut self) -> Option<Stmt> {
        let token = self.advance();
        if !self.in_loop() {
            self.error_at_previous(
                ErrorCode::LOOP_CONTROL_OUTSIDE_LOOP,
                format!("'{}' outside loop", token.kind),
            );
            return None;
        }
        self.expect_line_end()?;
        let kind = if token.kind == TokenKind::Break {
            StmtKind::Break
        } else {
            StmtKind::Continue
        };
        Some(Stmt::new(kind, token.span))
    }

    /// `local a, b` / `nonlocal a` / `global a`
    fn parse_decl(&mut self, scope: ScopeKind) -> Option<Stmt> {
        let keyword = self.advance();
        if !self.in_function() {
            self.error_at_previous(
                ErrorCode::DECLARATION_OUTSIDE_FUNCTION,
                format!("'{}' outside function", scope.keyword()),
            );
            return None;
        }
        let mut names = Vec::new();
        let mut span = keyword.span;
        loop {
            let name_token = self.peek().clone();
            let (name, name_span) = self.expect_identifier()?;
            self.declare(&name, scope, &name_token)?;
            names.push(name);
            span = span.merge(name_span);
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect_line_end()?;
        Some(Stmt::new(StmtKind::Decl { scope, names }, span))
    }

    /// Expression statement or `targets = values` assignment.
    fn parse_expr_stmt(&mut self) -> Option<Stmt> {
        let first = self.parse_expression()?;
        if !self.check_exact(&TokenKind::Comma) && !self.check_exact(&TokenKind::Eq) {
            self.expect_line_end()?;
            let span = first.span;
            return Some(Stmt::new(StmtKind::Expr(first), span));
        }

        let mut targets = vec![first];
        while self.eat(&TokenKind::Comma) {
            targets.push(self.parse_expression()?);
        }
        let eq = self.expect(&TokenKind::Eq)?;
        if targets.iter().any(|t| !t.is_assign_target()) {
            self.error_at(&eq, ErrorCode::INVALID_ASSIGN_TARGET, "invalid assignment target");
            return None;
        }
        let values = self.parse_expr_list()?;
        self.expect_line_end()?;
        let span = values
            .iter()
            .chain(targets.iter())
            .fold(eq.span, |span, e| span.merge(e.span));
        Some(Stmt::new(StmtKind::Assign { targets, values }, span))
    }

    /// `expr ("," expr)*`
    pub(crate) fn parse_expr_list(&mut self) -> Option<Vec<Expr>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.eat(&TokenKind::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Some(exprs)
    }
}
