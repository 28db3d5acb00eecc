//! Debug pretty-printer for the AST.
//!
//! Output is one statement per line with four spaces per indentation level.
//! Empty blocks print as `pass`, and every `if` prints its `else:` arm. Nested
//! binary and unary operands are parenthesized so precedence is visible.

use crate::ast::*;

const TAB_SIZE: usize = 4;

/// Render a whole program.
pub fn print_program(program: &Program) -> String {
    let mut p = Printer::default();
    for (i, stmt) in program.stmts.iter().enumerate() {
        if i > 0 {
            p.out.push('\n');
        }
        p.stmt(stmt);
    }
    p.out
}

/// Render a single expression.
pub fn print_expr(expr: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(expr);
    p.out
}

/// Format a number the way scripts see it: integral values without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Double-quoted string literal with the escapes the scanner understands.
pub fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[derive(Default)]
struct Printer {
    out: String,
    depth: usize,
}

impl Printer {
    fn indent(&mut self) {
        for _ in 0..self.depth * TAB_SIZE {
            self.out.push(' ');
        }
    }

    fn newline(&mut self) {
        self.out.push('\n');
        self.indent();
    }

    // ══════════════════════════════════════════════════════════════════════
    // Statements
    // ══════════════════════════════════════════════════════════════════════

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.expr(expr),
            StmtKind::Assign { targets, values } => {
                self.exprs(targets);
                self.out.push_str(" = ");
                self.exprs(values);
            }
            StmtKind::Def {
                decorators,
                target,
                func,
            } => {
                for deco in decorators {
                    self.out.push('@');
                    self.expr(deco);
                    self.newline();
                }
                self.out.push_str("def ");
                self.out.push_str(&target.name);
                self.out.push('(');
                self.out.push_str(&func.params.join(", "));
                self.out.push(')');
                self.block(&func.body);
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.out.push_str("if ");
                self.expr(cond);
                self.block(then_block);
                self.newline();
                self.out.push_str("else");
                self.block(else_block);
            }
            StmtKind::While { cond, body } => {
                self.out.push_str("while ");
                self.expr(cond);
                self.block(body);
            }
            StmtKind::For {
                vars,
                iterable,
                body,
            } => {
                self.out.push_str("for ");
                let names: Vec<&str> = vars.iter().map(|v| v.name.as_str()).collect();
                self.out.push_str(&names.join(", "));
                self.out.push_str(" in ");
                self.expr(iterable);
                self.block(body);
            }
            StmtKind::Try(try_stmt) => {
                self.out.push_str("try");
                self.block(&try_stmt.body);
                if let Some(handler) = &try_stmt.handler {
                    self.newline();
                    self.out.push_str("except");
                    if let Some(binding) = &handler.binding {
                        self.out.push_str(" as ");
                        self.out.push_str(&binding.name);
                    }
                    self.block(&handler.body);
                }
                if let Some(finally) = &try_stmt.finally {
                    self.newline();
                    self.out.push_str("finally");
                    self.block(finally);
                }
            }
            StmtKind::Raise(expr) => {
                self.out.push_str("raise ");
                self.expr(expr);
            }
            StmtKind::Return(values) => {
                self.out.push_str("return");
                if !values.is_empty() {
                    self.out.push(' ');
                    self.exprs(values);
                }
            }
            StmtKind::Break => self.out.push_str("break"),
            StmtKind::Continue => self.out.push_str("continue"),
            StmtKind::Decl { scope, names } => {
                self.out.push_str(scope.keyword());
                self.out.push(' ');
                self.out.push_str(&names.join(", "));
            }
            StmtKind::Bad(message) => {
                self.out.push_str("<bad statement: ");
                self.out.push_str(message);
                self.out.push('>');
            }
        }
    }

    fn block(&mut self, block: &Block) {
        self.out.push(':');
        self.depth += 1;
        if block.is_empty() {
            self.newline();
            self.out.push_str("pass");
        }
        for stmt in &block.stmts {
            self.newline();
            self.stmt(stmt);
        }
        self.depth -= 1;
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::None => self.out.push_str("None"),
            ExprKind::Bool(true) => self.out.push_str("True"),
            ExprKind::Bool(false) => self.out.push_str("False"),
            ExprKind::Number(n) => self.out.push_str(&format_number(*n)),
            ExprKind::Str(s) => self.out.push_str(&quote_str(s)),
            ExprKind::Var(var) => self.out.push_str(&var.name),
            ExprKind::Binary { left, op, right } => {
                self.operand(left);
                self.out.push(' ');
                self.out.push_str(op.as_str());
                self.out.push(' ');
                self.operand(right);
            }
            ExprKind::Unary { op, operand } => {
                self.out.push_str(op.as_str());
                self.operand(operand);
            }
            ExprKind::Call { callee, args } => {
                self.expr(callee);
                self.out.push('(');
                self.exprs(args);
                self.out.push(')');
            }
            ExprKind::Index { object, index } => {
                self.expr(object);
                self.out.push('[');
                self.expr(index);
                self.out.push(']');
            }
            ExprKind::Arrow { object, index } => {
                self.expr(object);
                self.out.push_str("->[");
                self.expr(index);
                self.out.push(']');
            }
            ExprKind::ProtoDict { proto, entries } => {
                self.expr(proto);
                self.entries(entries);
            }
            ExprKind::List(items) => {
                self.out.push('[');
                self.exprs(items);
                self.out.push(']');
            }
            ExprKind::Dict(entries) => self.entries(entries),
            ExprKind::Lambda(func) => {
                self.out.push_str("lambda");
                if !func.params.is_empty() {
                    self.out.push(' ');
                    self.out.push_str(&func.params.join(", "));
                }
                self.out.push_str(": ");
                if let Some(StmtKind::Return(values)) = func.body.stmts.first().map(|s| &s.kind) {
                    self.exprs(values);
                }
            }
        }
    }

    /// Operands of operators get parentheses when they are operators themselves.
    fn operand(&mut self, expr: &Expr) {
        if matches!(
            expr.kind,
            ExprKind::Binary { .. } | ExprKind::Unary { .. } | ExprKind::Lambda(_)
        ) {
            self.out.push('(');
            self.expr(expr);
            self.out.push(')');
        } else {
            self.expr(expr);
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(expr);
        }
    }

    fn entries(&mut self, entries: &[DictEntry]) {
        self.out.push('{');
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.expr(&entry.key);
            self.out.push_str(": ");
            self.expr(&entry.value);
        }
        self.out.push('}');
    }
}
