//! Statement execution.
//!
//! Each statement either completes or unwinds; loops absorb `Break` and
//! `Continue`, call boundaries absorb `Return`, and `try` intercepts
//! `Raise` only.

use yeva_types::ast::*;

use crate::error::{EvalResult, ExecResult, Exception, Unwind};
use crate::evaluator::{first_value, Evaluator};
use crate::stack::ensure_sufficient_stack;
use crate::value::Value;

/// What a loop body's outcome means for the loop.
enum LoopFlow {
    Next,
    Exit,
}

impl Evaluator {
    pub(crate) fn exec_block(&mut self, block: &Block) -> ExecResult {
        for stmt in &block.stmts {
            self.exec(stmt)?;
        }
        Ok(())
    }

    pub(crate) fn exec(&mut self, stmt: &Stmt) -> ExecResult {
        ensure_sufficient_stack(|| self.exec_inner(stmt))
    }

    fn exec_inner(&mut self, stmt: &Stmt) -> ExecResult {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
                Ok(())
            }
            StmtKind::Assign { targets, values } => {
                let values = self.eval_list(values)?;
                self.assign_all(targets, values)?;
                Ok(())
            }
            StmtKind::Def {
                decorators,
                target,
                func,
            } => self.exec_def(decorators, target, func),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.exec_block(then_block)
                } else {
                    self.exec_block(else_block)
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval(cond)?.is_truthy() {
                    if let LoopFlow::Exit = loop_flow(self.exec_block(body))? {
                        break;
                    }
                }
                Ok(())
            }
            StmtKind::For {
                vars,
                iterable,
                body,
            } => self.exec_for(vars, iterable, body),
            StmtKind::Try(try_stmt) => self.exec_try(try_stmt),
            StmtKind::Raise(payload) => Err(Unwind::Raise(self.eval(payload)?)),
            StmtKind::Return(values) => Err(Unwind::Return(self.eval_list(values)?)),
            StmtKind::Break => Err(Unwind::Break),
            StmtKind::Continue => Err(Unwind::Continue),
            // Declarations are resolved into each `VarRef` at parse time.
            StmtKind::Decl { .. } => Ok(()),
            // Programs with bad statements are rejected before execution.
            StmtKind::Bad(_) => Ok(()),
        }
    }

    /// Write `values` into `targets`, padding with `None` and dropping extras.
    fn assign_all(&mut self, targets: &[Expr], values: Vec<Value>) -> EvalResult<()> {
        let mut values = values.into_iter();
        for target in targets {
            let value = values.next().unwrap_or(Value::None);
            match &target.kind {
                ExprKind::Var(var) => self.assign_var(var, value)?,
                ExprKind::Index { object, index } => {
                    let object = self.eval(object)?;
                    let key = self.eval(index)?;
                    self.set_index(&object, key, value)?;
                }
                _ => return Err(Exception::msg("invalid assignment target")),
            }
        }
        Ok(())
    }

    fn exec_def(&mut self, decorators: &[Expr], target: &VarRef, func: &FuncDef) -> ExecResult {
        let mut decos = Vec::with_capacity(decorators.len());
        for deco in decorators {
            decos.push(self.eval(deco)?);
        }
        let mut value = self.make_function(func);
        for deco in decos.iter().rev() {
            if !deco.is_callable() {
                return Err(Exception::msg("decorator must be callable").into());
            }
            value = first_value(self.call(deco, vec![value])?);
        }
        self.bind_var(target, value)?;
        Ok(())
    }

    fn exec_for(&mut self, vars: &[VarRef], iterable: &Expr, body: &Block) -> ExecResult {
        let iterable = self.eval(iterable)?;
        for pair in self.snapshot(&iterable)? {
            let mut pair = pair.into_iter();
            for var in vars {
                self.assign_var(var, pair.next().unwrap_or(Value::None))?;
            }
            if let LoopFlow::Exit = loop_flow(self.exec_block(body))? {
                break;
            }
        }
        Ok(())
    }

    /// The pairs a `for` loop walks, taken before the first iteration.
    fn snapshot(&self, iterable: &Value) -> EvalResult<Vec<[Value; 2]>> {
        match iterable {
            Value::Doc(doc) => {
                let doc = doc.borrow();
                let array = self.is_array(&doc);
                let pairs = doc
                    .entries()
                    .map(|(key, value)| {
                        if array {
                            [value.clone(), key]
                        } else {
                            [key, value.clone()]
                        }
                    })
                    .collect();
                Ok(pairs)
            }
            Value::Str(s) => Ok(s
                .chars()
                .enumerate()
                .map(|(i, c)| [Value::from(c.to_string()), Value::Num(i as f64)])
                .collect()),
            _ => Err(Exception::msg("value is not iterable")),
        }
    }

    fn exec_try(&mut self, try_stmt: &TryStmt) -> ExecResult {
        let outcome = match (self.exec_block(&try_stmt.body), &try_stmt.handler) {
            (Err(Unwind::Raise(payload)), Some(handler)) => self.exec_handler(handler, payload),
            (outcome, _) => outcome,
        };
        if let Some(finally) = &try_stmt.finally {
            self.exec_block(finally)?;
        }
        outcome
    }

    fn exec_handler(&mut self, handler: &ExceptClause, payload: Value) -> ExecResult {
        if let Some(binding) = &handler.binding {
            self.bind_var(binding, payload)?;
        }
        self.exec_block(&handler.body)
    }
}

/// Absorb loop control; pass every other unwind through.
fn loop_flow(outcome: ExecResult) -> Result<LoopFlow, Unwind> {
    match outcome {
        Ok(()) | Err(Unwind::Continue) => Ok(LoopFlow::Next),
        Err(Unwind::Break) => Ok(LoopFlow::Exit),
        Err(other) => Err(other),
    }
}
