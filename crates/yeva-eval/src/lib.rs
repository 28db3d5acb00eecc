//! Yeva tree-walking evaluator.
//!
//! Runs parsed programs against a chain of environments with prototype
//! docs, multi-value calls and typed unwinding for `break`, `continue`,
//! `return` and `raise`.

mod config;
mod display;
mod env;
mod error;
mod evaluator;
mod exec;
mod natives;
mod stack;
mod value;

pub use config::{EvaluatorBuilder, DEFAULT_MAX_CALL_DEPTH};
pub use env::Env;
pub use error::{EvalResult, ExecResult, Exception, InterpretError, RuntimeError, Unwind};
pub use evaluator::Evaluator;
pub use natives::Output;
pub use value::{BoxObject, Doc, Func, Method, NativeFn, NativeFunc, Prototype, Value};
