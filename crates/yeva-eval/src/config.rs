//! `EvaluatorBuilder` for creating evaluators with host globals and limits.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::env::Env;
use crate::error::Exception;
use crate::evaluator::Evaluator;
use crate::natives::{self, Output};
use crate::value::{Doc, Value};

/// Nesting limit for user function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 200;

/// Builder for [`Evaluator`].
///
/// `println` is always available; natives and globals registered here are
/// added on top and may replace it.
pub struct EvaluatorBuilder {
    globals: BTreeMap<String, Value>,
    argv: Option<Vec<String>>,
    capture_output: bool,
    max_call_depth: usize,
}

impl Default for EvaluatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluatorBuilder {
    pub fn new() -> Self {
        Self {
            globals: BTreeMap::new(),
            argv: None,
            capture_output: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Register a host function under `name`.
    #[must_use]
    pub fn native(
        mut self,
        name: &str,
        func: impl Fn(&mut Evaluator, Vec<Value>) -> Result<Value, Exception> + 'static,
    ) -> Self {
        self.globals
            .insert(name.to_string(), Value::native(name, func));
        self
    }

    /// Seed a global binding.
    #[must_use]
    pub fn global(mut self, name: &str, value: Value) -> Self {
        self.globals.insert(name.to_string(), value);
        self
    }

    /// Script arguments, exposed as the list `argv`.
    #[must_use]
    pub fn argv<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.argv = Some(args.into_iter().map(Into::into).collect());
        self
    }

    /// Send `println` output to a buffer read with [`Evaluator::output`].
    #[must_use]
    pub fn capture_output(mut self) -> Self {
        self.capture_output = true;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Evaluator {
        let array_proto = Rc::new(RefCell::new(natives::array_prototype()));

        let mut globals = BTreeMap::new();
        globals.insert("println".to_string(), natives::println());
        if let Some(args) = self.argv {
            let mut argv = Doc::with_proto(Value::Doc(array_proto.clone()));
            for (i, arg) in args.into_iter().enumerate() {
                argv.insert(Value::Num(i as f64), Value::from(arg));
            }
            globals.insert("argv".to_string(), Value::doc(argv));
        }
        globals.extend(self.globals);

        let output = if self.capture_output {
            Output::Buffer(String::new())
        } else {
            Output::Stdout
        };

        let root = Env::root();
        Evaluator {
            env: root.clone(),
            root,
            globals,
            array_proto,
            output,
            max_call_depth: self.max_call_depth,
            depth: 0,
        }
    }
}
