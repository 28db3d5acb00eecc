//! Built-in natives and the `println` output sink.

use crate::error::{EvalResult, Exception};
use crate::evaluator::Evaluator;
use crate::value::{Doc, Value};

/// Where `println` writes.
#[derive(Debug)]
pub enum Output {
    /// Straight to stdout (default).
    Stdout,
    /// Captured for the host to read back.
    Buffer(String),
}

impl Output {
    pub fn println(&mut self, line: &str) {
        match self {
            Output::Stdout => println!("{line}"),
            Output::Buffer(buf) => {
                buf.push_str(line);
                buf.push('\n');
            }
        }
    }

    /// Captured text; empty for stdout.
    pub fn captured(&self) -> &str {
        match self {
            Output::Stdout => "",
            Output::Buffer(buf) => buf,
        }
    }
}

/// `println(a, b, ...)`: space-joined display forms and a newline.
pub(crate) fn println() -> Value {
    Value::native("println", |ev, args| {
        let line = args
            .iter()
            .map(|arg| ev.display(arg))
            .collect::<Vec<_>>()
            .join(" ");
        ev.output_mut().println(&line);
        Ok(Value::None)
    })
}

/// The prototype shared by every list: `len(self)` and `push(self, value)`.
pub(crate) fn array_prototype() -> Doc {
    let mut proto = Doc::new();
    proto.insert(Value::from("len"), Value::native("len", len));
    proto.insert(Value::from("push"), Value::native("push", push));
    proto
}

fn len(_: &mut Evaluator, args: Vec<Value>) -> EvalResult {
    match args.first() {
        Some(Value::Doc(doc)) => Ok(Value::Num(doc.borrow().len() as f64)),
        Some(Value::Str(s)) => Ok(Value::Num(s.chars().count() as f64)),
        _ => Err(Exception::msg("len expects a doc or a string")),
    }
}

fn push(_: &mut Evaluator, args: Vec<Value>) -> EvalResult {
    let mut args = args.into_iter();
    let Some(Value::Doc(doc)) = args.next() else {
        return Err(Exception::msg("push expects a doc"));
    };
    let value = args.next().unwrap_or(Value::None);
    let mut doc = doc.borrow_mut();
    let next = doc.len() as f64;
    doc.insert(Value::Num(next), value);
    Ok(Value::None)
}
