//! Human-readable rendering of values, as `println` shows them.

use std::cell::RefCell;
use std::rc::Rc;

use yeva_types::printer::{format_number, quote_str};

use crate::value::{Doc, Value};

pub(crate) struct Renderer<'a> {
    array_proto: &'a Rc<RefCell<Doc>>,
    /// Docs currently being rendered, to cut cycles.
    open: Vec<usize>,
    out: String,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(array_proto: &'a Rc<RefCell<Doc>>) -> Self {
        Self {
            array_proto,
            open: Vec::new(),
            out: String::new(),
        }
    }

    /// Render `value` as a top-level value: strings appear without quotes.
    pub(crate) fn render(mut self, value: &Value) -> String {
        match value {
            Value::Str(s) => s.to_string(),
            other => {
                self.value(other);
                self.out
            }
        }
    }

    fn value(&mut self, value: &Value) {
        match value {
            Value::None => self.out.push_str("None"),
            Value::Bool(true) => self.out.push_str("True"),
            Value::Bool(false) => self.out.push_str("False"),
            Value::Num(n) => self.out.push_str(&format_number(*n)),
            Value::Str(s) => self.out.push_str(&quote_str(s)),
            Value::Doc(doc) => self.doc(doc),
            Value::Func(f) => {
                self.out.push_str("<function ");
                self.out.push_str(&f.name);
                self.out.push('>');
            }
            Value::NativeFunc(f) => {
                self.out.push_str("<native function ");
                self.out.push_str(&f.name);
                self.out.push('>');
            }
            Value::Method(m) => {
                self.out.push_str("<method ");
                self.out.push_str(m.callable.callable_name().unwrap_or("?"));
                self.out.push('>');
            }
            Value::Box(b) => {
                self.out.push_str("<box ");
                self.out.push_str(b.type_name());
                self.out.push('>');
            }
        }
    }

    fn doc(&mut self, doc: &Rc<RefCell<Doc>>) {
        let id = Rc::as_ptr(doc) as usize;
        if self.open.contains(&id) {
            self.out.push_str("...");
            return;
        }
        self.open.push(id);
        let doc = doc.borrow();
        if is_array(&doc, self.array_proto) {
            self.out.push('[');
            for (i, (_, item)) in doc.entries().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.value(item);
            }
            self.out.push(']');
        } else {
            self.out.push('{');
            for (i, (key, item)) in doc.entries().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.value(&key);
                self.out.push_str(": ");
                self.value(item);
            }
            self.out.push('}');
        }
        self.open.pop();
    }
}

/// Whether `doc` was built as a list: its prototype is the array prototype.
pub(crate) fn is_array(doc: &Doc, array_proto: &Rc<RefCell<Doc>>) -> bool {
    matches!(doc.proto(), Some(Value::Doc(proto)) if Rc::ptr_eq(proto, array_proto))
}
