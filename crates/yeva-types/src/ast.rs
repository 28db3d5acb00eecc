//! AST node types for the Yeva language.
//!
//! Every node carries a [`Span`] for error reporting. The tree is immutable
//! once the parser returns it. Function bodies sit behind an [`Rc`] so
//! function values created at run time can outlive the [`Program`] they came
//! from.

use crate::Span;
use std::fmt;
use std::rc::Rc;

// ══════════════════════════════════════════════════════════════════════════════
// Top Level
// ══════════════════════════════════════════════════════════════════════════════

/// A parsed script: top-level statements in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

/// An indented statement list. Empty when the source only held `pass`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(stmts: Vec<Stmt>, span: Span) -> Self {
        Self { stmts, span }
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Variables
// ══════════════════════════════════════════════════════════════════════════════

/// How an identifier occurrence binds, fixed by the parser from the
/// `local`/`nonlocal`/`global` declarations of the enclosing function body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Undeclared: walk the environment chain, then the globals.
    Dynamic,
    /// Current frame only.
    Local,
    /// Strictly enclosing frames only; never creates a binding.
    NonLocal,
    /// The process-wide globals mapping only.
    Global,
}

impl ScopeKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ScopeKind::Dynamic => "",
            ScopeKind::Local => "local",
            ScopeKind::NonLocal => "nonlocal",
            ScopeKind::Global => "global",
        }
    }
}

/// A resolved identifier occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub name: String,
    pub scope: ScopeKind,
}

impl VarRef {
    pub fn new(name: impl Into<String>, scope: ScopeKind) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }

    pub fn dynamic(name: impl Into<String>) -> Self {
        Self::new(name, ScopeKind::Dynamic)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// A bare expression evaluated for its effects.
    Expr(Expr),
    /// `a, b[i], c.d = x, y`
    Assign { targets: Vec<Expr>, values: Vec<Expr> },
    /// `@deco` lines (top to bottom) followed by `def name(params):`.
    Def {
        decorators: Vec<Expr>,
        target: VarRef,
        func: FuncDef,
    },
    /// `if` / `elif` / `else`; an `elif` chain nests inside `else_block`.
    If {
        cond: Expr,
        then_block: Block,
        else_block: Block,
    },
    While { cond: Expr, body: Block },
    /// `for a, b in iterable:`
    For {
        vars: Vec<VarRef>,
        iterable: Expr,
        body: Block,
    },
    Try(TryStmt),
    Raise(Expr),
    Return(Vec<Expr>),
    Break,
    Continue,
    /// `local a, b` / `nonlocal a` / `global a`
    Decl { scope: ScopeKind, names: Vec<String> },
    /// Placeholder for a statement that failed to parse.
    Bad(String),
}

/// `try:` with an optional `except [as name]:` and an optional `finally:`.
/// The parser guarantees at least one of the two clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub body: Block,
    pub handler: Option<ExceptClause>,
    pub finally: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptClause {
    pub binding: Option<VarRef>,
    pub body: Block,
}

/// Shared shape of `def` statements and `lambda` expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
}

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Whether the expression may appear left of `=`.
    pub fn is_assign_target(&self) -> bool {
        matches!(self.kind, ExprKind::Var(_) | ExprKind::Index { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    // ── Literals ──
    None,
    Bool(bool),
    Number(f64),
    Str(String),

    Var(VarRef),

    // ── Operators ──
    Binary {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    // ── Postfix ──
    /// `callee(args)`
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// `object[index]`; `object.name` is parsed as `object["name"]`.
    Index { object: Box<Expr>, index: Box<Expr> },
    /// `object->[index]` / `object->name`: one-level prototype lookup.
    Arrow { object: Box<Expr>, index: Box<Expr> },
    /// `proto{k: v}`: a dict literal whose prototype is `proto`.
    ProtoDict {
        proto: Box<Expr>,
        entries: Vec<DictEntry>,
    },

    // ── Composites ──
    List(Vec<Expr>),
    Dict(Vec<DictEntry>),
    Lambda(FuncDef),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictEntry {
    pub key: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    Or,
    And,
    // Comparison
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::LessEq => "<=",
            BinOp::Greater => ">",
            BinOp::GreaterEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `+x`
    Plus,
    /// `not x`
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "not ",
        }
    }
}
