//! Environment chain for the Yeva evaluator.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::value::Value;

#[derive(Default)]
struct Frame {
    bindings: BTreeMap<String, Value>,
    parent: Option<Env>,
}

/// A shared frame of bindings with a link to its enclosing frame.
///
/// Each call gets a fresh frame whose parent is the callee's closure, so a
/// function sees the scope it was defined in, never its caller's.
#[derive(Clone, Default)]
pub struct Env(Rc<RefCell<Frame>>);

impl Env {
    /// A frame with no parent (the module root).
    pub fn root() -> Self {
        Self::default()
    }

    /// A new frame enclosed by `self`.
    pub fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Frame {
            bindings: BTreeMap::new(),
            parent: Some(self.clone()),
        })))
    }

    fn parent(&self) -> Option<Env> {
        self.0.borrow().parent.clone()
    }

    /// Create or overwrite a binding in this frame.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().bindings.insert(name.to_string(), value);
    }

    /// Read a binding in this frame only.
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.0.borrow().bindings.get(name).cloned()
    }

    /// Read a binding, searching this frame and then its ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut frame = Some(self.clone());
        while let Some(env) = frame {
            if let Some(value) = env.get_local(name) {
                return Some(value);
            }
            frame = env.parent();
        }
        None
    }

    /// Read a binding from the enclosing frames, skipping this one.
    pub fn get_enclosing(&self, name: &str) -> Option<Value> {
        self.parent().and_then(|parent| parent.get(name))
    }

    /// The nearest frame, starting at this one, that binds `name`.
    fn find(&self, name: &str) -> Option<Env> {
        let mut frame = Some(self.clone());
        while let Some(env) = frame {
            if env.0.borrow().bindings.contains_key(name) {
                return Some(env);
            }
            frame = env.parent();
        }
        None
    }

    /// Update the nearest existing binding of `name`, starting at this frame.
    /// Returns `false` if no frame binds it.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        self.try_assign(name, value).is_ok()
    }

    /// Like [`Env::assign`], but skips this frame.
    pub fn assign_enclosing(&self, name: &str, value: Value) -> bool {
        match self.parent() {
            Some(parent) => parent.assign(name, value),
            None => false,
        }
    }

    /// Update the nearest binding of `name`, or create it in this frame.
    pub fn set(&self, name: &str, value: Value) {
        if let Err(value) = self.try_assign(name, value) {
            self.define(name, value);
        }
    }

    /// Update the nearest binding, handing `value` back if there is none.
    fn try_assign(&self, name: &str, value: Value) -> Result<(), Value> {
        match self.find(name) {
            Some(frame) => {
                frame.define(name, value);
                Ok(())
            }
            None => Err(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_outward() {
        let root = Env::root();
        root.define("x", Value::Num(1.0));
        let inner = root.child().child();
        assert_eq!(inner.get("x"), Some(Value::Num(1.0)));
        assert_eq!(inner.get_local("x"), None);
    }

    #[test]
    fn assign_updates_nearest_binding() {
        let root = Env::root();
        root.define("x", Value::Num(1.0));
        let mid = root.child();
        mid.define("x", Value::Num(2.0));
        let inner = mid.child();
        assert!(inner.assign("x", Value::Num(3.0)));
        assert_eq!(mid.get_local("x"), Some(Value::Num(3.0)));
        assert_eq!(root.get_local("x"), Some(Value::Num(1.0)));
        assert!(!inner.assign("y", Value::None));
    }

    #[test]
    fn enclosing_skips_current_frame() {
        let root = Env::root();
        let inner = root.child();
        inner.define("x", Value::Num(1.0));
        assert_eq!(inner.get_enclosing("x"), None);
        assert!(!inner.assign_enclosing("x", Value::Num(2.0)));
        root.define("x", Value::Num(5.0));
        assert!(inner.assign_enclosing("x", Value::Num(6.0)));
        assert_eq!(root.get_local("x"), Some(Value::Num(6.0)));
        assert_eq!(inner.get_local("x"), Some(Value::Num(1.0)));
    }
}
