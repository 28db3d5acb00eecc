//! Body contexts and compile-time scope resolution.
//!
//! Every `def` and `lambda` opens a new body. A body remembers whether it is
//! a function (gates `return` and scope declarations), how many loops are
//! open inside it (gates `break`/`continue`), and which names it declared
//! `local`/`nonlocal`/`global`. Each identifier occurrence is stamped with
//! the declaration in force for its body, so the evaluator never consults a
//! per-frame declaration table.
//!
//! A declaration must come before any use of the name in the same body.

use std::collections::{HashMap, HashSet};

use yeva_lexer::Token;
use yeva_types::ast::{ScopeKind, VarRef};
use yeva_types::ErrorCode;

use crate::parser::Parser;

#[derive(Debug, Default)]
pub(crate) struct Body {
    is_function: bool,
    loop_depth: u32,
    declared: HashMap<String, ScopeKind>,
    referenced: HashSet<String>,
}

impl Body {
    pub(crate) fn module() -> Self {
        Self::default()
    }

    fn function(params: &[String]) -> Self {
        Self {
            is_function: true,
            referenced: params.iter().cloned().collect(),
            ..Self::default()
        }
    }
}

impl<'src> Parser<'src> {
    fn body(&self) -> &Body {
        // The module body is pushed in `Parser::new` and never popped.
        &self.bodies[self.bodies.len() - 1]
    }

    fn body_mut(&mut self) -> &mut Body {
        let last = self.bodies.len() - 1;
        &mut self.bodies[last]
    }

    pub(crate) fn in_function(&self) -> bool {
        self.body().is_function
    }

    pub(crate) fn in_loop(&self) -> bool {
        self.body().loop_depth > 0
    }

    /// Run `f` with a new function body whose parameters are `params`.
    pub(crate) fn with_function<T>(
        &mut self,
        params: &[String],
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        self.bodies.push(Body::function(params));
        let result = f(self);
        self.bodies.pop();
        result
    }

    /// Run `f` one loop deeper in the current body.
    pub(crate) fn with_loop<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        self.body_mut().loop_depth += 1;
        let result = f(self);
        self.body_mut().loop_depth -= 1;
        result
    }

    /// Record a use of `name` and return its resolved reference.
    pub(crate) fn resolve(&mut self, name: &str) -> VarRef {
        let body = self.body_mut();
        body.referenced.insert(name.to_string());
        let scope = body.declared.get(name).copied().unwrap_or(ScopeKind::Dynamic);
        VarRef::new(name, scope)
    }

    /// Apply a `local`/`nonlocal`/`global` declaration for `name`.
    pub(crate) fn declare(&mut self, name: &str, scope: ScopeKind, at: &Token) -> Option<()> {
        let body = self.body();
        let failure = match body.declared.get(name) {
            Some(&existing) if existing != scope => Some((
                ErrorCode::CONFLICTING_DECLARATION,
                format!("'{name}' is already declared {}", existing.keyword()),
            )),
            Some(_) => None,
            None if body.referenced.contains(name) => Some((
                ErrorCode::DECLARATION_AFTER_USE,
                format!("'{name}' is used before its {} declaration", scope.keyword()),
            )),
            None => None,
        };
        if let Some((code, message)) = failure {
            self.error_at(at, code, message);
            return None;
        }
        self.body_mut().declared.insert(name.to_string(), scope);
        Some(())
    }
}
