//! Runtime error and unwind types for the Yeva evaluator.

use thiserror::Error;
use yeva_types::{CompileError, CompileErrors};

use crate::value::Value;

/// A raised value travelling up through expression evaluation.
///
/// Every user-visible runtime failure is one of these, with a string
/// payload for failures the evaluator itself detects. Scripts catch them
/// with `try`/`except`.
#[derive(Debug, Clone)]
pub struct Exception {
    pub payload: Value,
}

impl Exception {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// An exception whose payload is the string `message`.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(Value::from(message.into()))
    }
}

/// Non-local exit from statement execution.
///
/// Only `Raise` is visible to `except`; the other three are flow control
/// caught by loops and call boundaries.
#[derive(Debug, Clone)]
pub enum Unwind {
    Break,
    Continue,
    Return(Vec<Value>),
    Raise(Value),
}

impl From<Exception> for Unwind {
    fn from(exc: Exception) -> Self {
        Unwind::Raise(exc.payload)
    }
}

/// Result of evaluating an expression.
pub type EvalResult<T = Value> = Result<T, Exception>;

/// Result of executing a statement.
pub type ExecResult = Result<(), Unwind>;

/// An exception that escaped to the top level.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RuntimeError {
    /// The payload as `println` would show it.
    pub message: String,
    pub payload: Value,
}

#[derive(Debug, Clone, Error)]
pub enum InterpretError {
    /// The source did not compile; `first` is the diagnostic reported.
    #[error("{first}")]
    Compile {
        first: Box<CompileError>,
        errors: CompileErrors,
    },
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
