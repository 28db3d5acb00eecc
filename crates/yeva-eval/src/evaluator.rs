//! Core evaluator: state, entry points, calls and expressions.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::mem;
use std::rc::Rc;

use yeva_parser::parse_source;
use yeva_types::ast::*;

use crate::config::EvaluatorBuilder;
use crate::display::{self, Renderer};
use crate::env::Env;
use crate::error::{EvalResult, Exception, InterpretError, RuntimeError, Unwind};
use crate::natives::Output;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Doc, Func, Method, Prototype, Value};

/// Name diagnostics use for interpreted source.
const SCRIPT_NAME: &str = "<script>";

/// The tree-walking evaluator.
///
/// The module root environment and the globals persist across
/// [`Evaluator::interpret`] calls, so a REPL can feed it one line at a time.
pub struct Evaluator {
    /// Environment of the code currently running.
    pub(crate) env: Env,
    pub(crate) root: Env,
    pub(crate) globals: BTreeMap<String, Value>,
    pub(crate) array_proto: Rc<RefCell<Doc>>,
    pub(crate) output: Output,
    pub(crate) max_call_depth: usize,
    /// Active user function calls.
    pub(crate) depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        EvaluatorBuilder::new().build()
    }

    pub fn builder() -> EvaluatorBuilder {
        EvaluatorBuilder::new()
    }

    // ══════════════════════════════════════════════════════════════════════
    // Host API
    // ══════════════════════════════════════════════════════════════════════

    /// Compile `source` and run its top-level statements.
    pub fn interpret(&mut self, source: &str) -> Result<(), InterpretError> {
        self.env = self.root.clone();
        self.depth = 0;

        let parsed = parse_source(SCRIPT_NAME, source);
        if let Some(first) = parsed.first_error().cloned() {
            return Err(InterpretError::Compile {
                first: Box::new(first),
                errors: parsed.errors,
            });
        }

        for stmt in &parsed.program.stmts {
            match self.exec(stmt) {
                Ok(()) => {}
                Err(Unwind::Raise(payload)) => {
                    let message = self.display(&payload);
                    tracing::debug!(%message, "uncaught exception");
                    self.env = self.root.clone();
                    return Err(RuntimeError { message, payload }.into());
                }
                // `return`, `break` and `continue` cannot reach the top level.
                Err(_) => {}
            }
        }
        Ok(())
    }

    /// Call any callable value with `args`, returning every value it produced.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult<Vec<Value>> {
        match callee {
            Value::Func(func) => self.call_function(func, args),
            Value::NativeFunc(native) => Ok(vec![native.invoke(self, args)?]),
            Value::Method(method) => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(method.receiver.clone());
                full.extend(args);
                self.call(&method.callable, full)
            }
            _ => Err(Exception::msg("can only call functions")),
        }
    }

    /// Call `callee` in a single-value context.
    pub fn call_single(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        Ok(first_value(self.call(callee, args)?))
    }

    /// A global binding, if present.
    pub fn global(&self, name: &str) -> Option<Value> {
        self.globals.get(name).cloned()
    }

    /// A binding of the module root environment, if present.
    pub fn root_binding(&self, name: &str) -> Option<Value> {
        self.root.get_local(name)
    }

    /// Everything `println` wrote so far, when output is captured.
    pub fn output(&self) -> &str {
        self.output.captured()
    }

    pub(crate) fn output_mut(&mut self) -> &mut Output {
        &mut self.output
    }

    /// `value` as `println` prints it.
    pub fn display(&self, value: &Value) -> String {
        Renderer::new(&self.array_proto).render(value)
    }

    /// A new list holding `items`.
    pub fn new_list(&self, items: impl IntoIterator<Item = Value>) -> Value {
        let mut doc = Doc::with_proto(Value::Doc(self.array_proto.clone()));
        for (i, item) in items.into_iter().enumerate() {
            doc.insert(Value::Num(i as f64), item);
        }
        Value::doc(doc)
    }

    pub(crate) fn is_array(&self, doc: &Doc) -> bool {
        display::is_array(doc, &self.array_proto)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Calls
    // ══════════════════════════════════════════════════════════════════════

    fn call_function(&mut self, func: &Rc<Func>, args: Vec<Value>) -> EvalResult<Vec<Value>> {
        if self.depth >= self.max_call_depth {
            return Err(Exception::msg("maximum call depth exceeded"));
        }
        tracing::trace!(function = %func.name, args = args.len(), depth = self.depth, "call");

        let frame = func.closure.child();
        let mut args = args.into_iter();
        for param in &func.params {
            frame.define(param, args.next().unwrap_or(Value::None));
        }

        let caller = mem::replace(&mut self.env, frame);
        self.depth += 1;
        let outcome = self.exec_block(&func.body);
        self.depth -= 1;
        self.env = caller;

        match outcome {
            Ok(()) | Err(Unwind::Break) | Err(Unwind::Continue) => Ok(vec![Value::None]),
            Err(Unwind::Return(values)) => Ok(values),
            Err(Unwind::Raise(payload)) => Err(Exception::new(payload)),
        }
    }

    pub(crate) fn make_function(&self, def: &FuncDef) -> Value {
        Value::Func(Rc::new(Func {
            name: def.name.clone(),
            params: def.params.clone(),
            body: def.body.clone(),
            closure: self.env.clone(),
        }))
    }

    // ══════════════════════════════════════════════════════════════════════
    // Variables
    // ══════════════════════════════════════════════════════════════════════

    fn lookup(&self, var: &VarRef) -> EvalResult {
        let found = match var.scope {
            ScopeKind::Dynamic => self
                .env
                .get(&var.name)
                .or_else(|| self.globals.get(&var.name).cloned()),
            ScopeKind::Local => self.env.get_local(&var.name),
            ScopeKind::NonLocal => self.env.get_enclosing(&var.name),
            ScopeKind::Global => self.globals.get(&var.name).cloned(),
        };
        found.ok_or_else(|| undefined(&var.name))
    }

    pub(crate) fn assign_var(&mut self, var: &VarRef, value: Value) -> EvalResult<()> {
        match var.scope {
            ScopeKind::Dynamic => self.env.set(&var.name, value),
            ScopeKind::Local => self.env.define(&var.name, value),
            ScopeKind::NonLocal => {
                if !self.env.assign_enclosing(&var.name, value) {
                    return Err(undefined(&var.name));
                }
            }
            ScopeKind::Global => {
                self.globals.insert(var.name.clone(), value);
            }
        }
        Ok(())
    }

    /// Bind `var` in the current frame unless a declaration routes it
    /// elsewhere. Used by `def` and `except as`, which never write outward.
    pub(crate) fn bind_var(&mut self, var: &VarRef, value: Value) -> EvalResult<()> {
        match var.scope {
            ScopeKind::Dynamic => {
                self.env.define(&var.name, value);
                Ok(())
            }
            _ => self.assign_var(var, value),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    pub(crate) fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::None => Ok(Value::None),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Number(n) => Ok(Value::Num(*n)),
            ExprKind::Str(s) => Ok(Value::from(s.as_str())),
            ExprKind::Var(var) => self.lookup(var),

            ExprKind::Binary { left, op, right } => self.eval_binary(left, *op, right),
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),

            ExprKind::Call { .. } => Ok(first_value(self.eval_multi(expr)?)),
            ExprKind::Index { object, index } => {
                let object = self.eval(object)?;
                let key = self.eval(index)?;
                self.get_index(&object, &key)
            }
            ExprKind::Arrow { object, index } => {
                let object = self.eval(object)?;
                let key = self.eval(index)?;
                self.get_arrow(object, &key)
            }

            ExprKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item)?);
                }
                Ok(self.new_list(values))
            }
            ExprKind::Dict(entries) => {
                let doc = self.eval_entries(Doc::new(), entries)?;
                Ok(Value::doc(doc))
            }
            ExprKind::ProtoDict { proto, entries } => {
                let proto = self.eval(proto)?;
                if !matches!(proto, Value::Doc(_) | Value::Box(_)) {
                    return Err(Exception::msg("prototype must be a doc"));
                }
                let doc = self.eval_entries(Doc::with_proto(proto), entries)?;
                Ok(Value::doc(doc))
            }
            ExprKind::Lambda(def) => Ok(self.make_function(def)),
        }
    }

    /// Evaluate an expression that may produce several values: a call
    /// yields all it returned, anything else exactly one value.
    fn eval_multi(&mut self, expr: &Expr) -> EvalResult<Vec<Value>> {
        match &expr.kind {
            ExprKind::Call { callee, args } => {
                let callee = self.eval(callee)?;
                let args = self.eval_list(args)?;
                self.call(&callee, args)
            }
            _ => Ok(vec![self.eval(expr)?]),
        }
    }

    /// Evaluate a comma list; only the last element may expand.
    pub(crate) fn eval_list(&mut self, exprs: &[Expr]) -> EvalResult<Vec<Value>> {
        let mut values = Vec::with_capacity(exprs.len());
        if let Some((last, init)) = exprs.split_last() {
            for expr in init {
                values.push(self.eval(expr)?);
            }
            values.extend(self.eval_multi(last)?);
        }
        Ok(values)
    }

    fn eval_entries(&mut self, mut doc: Doc, entries: &[DictEntry]) -> EvalResult<Doc> {
        for entry in entries {
            let key = self.eval(&entry.key)?;
            let value = self.eval(&entry.value)?;
            doc.insert(key, value);
        }
        Ok(doc)
    }

    fn eval_binary(&mut self, left: &Expr, op: BinOp, right: &Expr) -> EvalResult {
        let lhs = self.eval(left)?;
        match op {
            BinOp::And if lhs.is_truthy() => self.eval(right),
            BinOp::Or if !lhs.is_truthy() => self.eval(right),
            BinOp::And | BinOp::Or => Ok(lhs),
            BinOp::Eq => Ok(Value::Bool(lhs == self.eval(right)?)),
            BinOp::NotEq => Ok(Value::Bool(lhs != self.eval(right)?)),
            BinOp::Add => match (lhs, self.eval(right)?) {
                (Value::Num(a), Value::Num(b)) => Ok(Value::Num(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::from(format!("{a}{b}"))),
                _ => Err(Exception::msg("operands must be numbers or strings")),
            },
            BinOp::Sub => self.numeric(lhs, right, |a, b| Value::Num(a - b)),
            BinOp::Mul => self.numeric(lhs, right, |a, b| Value::Num(a * b)),
            BinOp::Div => self.numeric(lhs, right, |a, b| Value::Num(a / b)),
            BinOp::Pow => self.numeric(lhs, right, |a, b| Value::Num(a.powf(b))),
            BinOp::Less => self.numeric(lhs, right, |a, b| Value::Bool(a < b)),
            BinOp::LessEq => self.numeric(lhs, right, |a, b| Value::Bool(a <= b)),
            BinOp::Greater => self.numeric(lhs, right, |a, b| Value::Bool(a > b)),
            BinOp::GreaterEq => self.numeric(lhs, right, |a, b| Value::Bool(a >= b)),
        }
    }

    fn numeric(
        &mut self,
        lhs: Value,
        right: &Expr,
        apply: impl FnOnce(f64, f64) -> Value,
    ) -> EvalResult {
        let rhs = self.eval(right)?;
        match (lhs.as_num(), rhs.as_num()) {
            (Some(a), Some(b)) => Ok(apply(a, b)),
            _ => Err(Exception::msg("operands must be numbers")),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> EvalResult {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
            UnaryOp::Neg | UnaryOp::Plus => {
                let Some(n) = value.as_num() else {
                    return Err(Exception::msg("operand must be a number"));
                };
                Ok(Value::Num(if op == UnaryOp::Neg { -n } else { n }))
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Index & prototype access
    // ══════════════════════════════════════════════════════════════════════

    /// `object[key]`: own entries only, `None` when missing.
    pub(crate) fn get_index(&self, object: &Value, key: &Value) -> EvalResult {
        match object {
            Value::Doc(doc) => Ok(doc.index(key)),
            Value::Box(boxed) => Ok(boxed.index(key)),
            Value::Str(s) => Ok(char_at(s, key)),
            _ => Err(Exception::msg("value is not indexable")),
        }
    }

    /// `object[key] = value`.
    pub(crate) fn set_index(&self, object: &Value, key: Value, value: Value) -> EvalResult<()> {
        match object {
            Value::Doc(doc) => doc.set_index(key, value),
            Value::Box(boxed) => boxed.set_index(key, value),
            _ => Err(Exception::msg("value does not support item assignment")),
        }
    }

    /// `object->[key]`: one level up the prototype, skipping own entries.
    /// Callables come back bound to `object`.
    fn get_arrow(&self, object: Value, key: &Value) -> EvalResult {
        let proto = match &object {
            Value::Doc(doc) => doc.prototype(),
            Value::Box(boxed) => boxed.prototype(),
            _ => return Err(Exception::msg("value has no prototype")),
        };
        let Some(proto) = proto else {
            return Ok(Value::None);
        };
        let found = self.get_index(&proto, key)?;
        if found.is_callable() {
            Ok(Value::Method(Rc::new(Method {
                receiver: object,
                callable: found,
            })))
        } else {
            Ok(found)
        }
    }
}

fn undefined(name: &str) -> Exception {
    Exception::msg(format!("undefined variable '{name}'"))
}

pub(crate) fn first_value(values: Vec<Value>) -> Value {
    values.into_iter().next().unwrap_or(Value::None)
}

/// One-character string at an integral index, `None` out of range.
fn char_at(s: &str, key: &Value) -> Value {
    match key.as_num() {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => s
            .chars()
            .nth(n as usize)
            .map(|c| Value::from(c.to_string()))
            .unwrap_or(Value::None),
        _ => Value::None,
    }
}
