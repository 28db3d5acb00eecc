//! Runtime values.
//!
//! Primitives (`None`, `Bool`, `Num`, `Str`) compare structurally; docs,
//! functions and boxes are shared references and compare by identity.
//! A [`Method`] compares equal to another when both its receiver and its
//! callable do.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use yeva_types::ast::Block;

use crate::env::Env;
use crate::error::Exception;
use crate::evaluator::Evaluator;

/// Host closure behind a [`NativeFunc`].
pub type NativeFn = dyn Fn(&mut Evaluator, Vec<Value>) -> Result<Value, Exception>;

#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    Doc(Rc<RefCell<Doc>>),
    Func(Rc<Func>),
    NativeFunc(Rc<NativeFunc>),
    Method(Rc<Method>),
    Box(Rc<dyn BoxObject>),
}

impl Value {
    pub fn doc(doc: Doc) -> Self {
        Value::Doc(Rc::new(RefCell::new(doc)))
    }

    pub fn native(
        name: impl Into<String>,
        func: impl Fn(&mut Evaluator, Vec<Value>) -> Result<Value, Exception> + 'static,
    ) -> Self {
        Value::NativeFunc(Rc::new(NativeFunc::new(name, func)))
    }

    /// `None` and `False` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::None | Value::Bool(false))
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Func(_) | Value::NativeFunc(_) | Value::Method(_)
        )
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Name of a callable, as shown by `<function name>` and friends.
    pub fn callable_name(&self) -> Option<&str> {
        match self {
            Value::Func(f) => Some(&f.name),
            Value::NativeFunc(f) => Some(&f.name),
            Value::Method(m) => m.callable.callable_name(),
            _ => None,
        }
    }

    /// Address of the shared allocation behind a reference value.
    pub(crate) fn address(&self) -> Option<usize> {
        let ptr = match self {
            Value::Doc(rc) => Rc::as_ptr(rc) as *const (),
            Value::Func(rc) => Rc::as_ptr(rc) as *const (),
            Value::NativeFunc(rc) => Rc::as_ptr(rc) as *const (),
            Value::Method(rc) => Rc::as_ptr(rc) as *const (),
            Value::Box(rc) => Rc::as_ptr(rc) as *const (),
            _ => return None,
        };
        Some(ptr as usize)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => {
                a.receiver == b.receiver && a.callable == b.callable
            }
            (Value::Doc(_), Value::Doc(_))
            | (Value::Func(_), Value::Func(_))
            | (Value::NativeFunc(_), Value::NativeFunc(_))
            | (Value::Box(_), Value::Box(_)) => self.address() == other.address(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Num(n) => write!(f, "Num({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Doc(doc) => write!(f, "Doc(len {})", doc.borrow().len()),
            Value::Func(func) => write!(f, "Func({})", func.name),
            Value::NativeFunc(func) => write!(f, "NativeFunc({})", func.name),
            Value::Method(m) => write!(f, "Method({:?})", m.callable),
            Value::Box(b) => write!(f, "Box({})", b.type_name()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s.into())
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Callables
// ══════════════════════════════════════════════════════════════════════════════

/// A user function: `def` or `lambda` plus the environment it closed over.
pub struct Func {
    pub name: String,
    pub params: Vec<String>,
    pub body: Rc<Block>,
    pub closure: Env,
}

pub struct NativeFunc {
    pub name: String,
    func: Box<NativeFn>,
}

impl NativeFunc {
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut Evaluator, Vec<Value>) -> Result<Value, Exception> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }

    pub fn invoke(&self, evaluator: &mut Evaluator, args: Vec<Value>) -> Result<Value, Exception> {
        (self.func)(evaluator, args)
    }
}

/// A callable bound to the receiver it was looked up through with `->`.
pub struct Method {
    pub receiver: Value,
    pub callable: Value,
}

// ══════════════════════════════════════════════════════════════════════════════
// Prototype capability
// ══════════════════════════════════════════════════════════════════════════════

/// Keyed access plus an optional prototype. Implemented by [`Doc`] and by
/// host objects placed in a [`Value::Box`].
pub trait Prototype {
    /// Own entry for `key`, `None` when absent.
    fn index(&self, key: &Value) -> Value;

    fn set_index(&self, key: Value, value: Value) -> Result<(), Exception>;

    fn prototype(&self) -> Option<Value>;
}

/// A host-defined object with computed properties.
pub trait BoxObject: Prototype {
    /// Shown as `<box type_name>`.
    fn type_name(&self) -> &str;
}

// ══════════════════════════════════════════════════════════════════════════════
// Doc
// ══════════════════════════════════════════════════════════════════════════════

/// The language's associative container; arrays are docs keyed `0..n`.
#[derive(Default)]
pub struct Doc {
    entries: BTreeMap<DocKey, Value>,
    proto: Option<Value>,
}

impl Doc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proto(proto: Value) -> Self {
        Self {
            entries: BTreeMap::new(),
            proto: Some(proto),
        }
    }

    pub fn get(&self, key: &Value) -> Option<Value> {
        self.entries.get(&DocKey::from(key)).cloned()
    }

    pub fn insert(&mut self, key: Value, value: Value) {
        self.entries.insert(DocKey::from(&key), value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn proto(&self) -> Option<&Value> {
        self.proto.as_ref()
    }

    /// Entries in key order: `None`, booleans, numbers ascending, strings,
    /// then references.
    pub fn entries(&self) -> impl Iterator<Item = (Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k.to_value(), v))
    }
}

impl Prototype for RefCell<Doc> {
    fn index(&self, key: &Value) -> Value {
        self.borrow().get(key).unwrap_or(Value::None)
    }

    fn set_index(&self, key: Value, value: Value) -> Result<(), Exception> {
        self.borrow_mut().insert(key, value);
        Ok(())
    }

    fn prototype(&self) -> Option<Value> {
        self.borrow().proto.clone()
    }
}

/// Ordered map key derived from a [`Value`].
#[derive(Clone)]
enum DocKey {
    None,
    Bool(bool),
    Num(f64),
    Str(Rc<str>),
    /// Reference values are keyed by identity.
    Ref(usize, Value),
}

impl DocKey {
    fn rank(&self) -> u8 {
        match self {
            DocKey::None => 0,
            DocKey::Bool(_) => 1,
            DocKey::Num(_) => 2,
            DocKey::Str(_) => 3,
            DocKey::Ref(..) => 4,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            DocKey::None => Value::None,
            DocKey::Bool(b) => Value::Bool(*b),
            DocKey::Num(n) => Value::Num(*n),
            DocKey::Str(s) => Value::Str(s.clone()),
            DocKey::Ref(_, v) => v.clone(),
        }
    }
}

impl From<&Value> for DocKey {
    fn from(value: &Value) -> Self {
        match value {
            Value::None => DocKey::None,
            Value::Bool(b) => DocKey::Bool(*b),
            // -0 and 0 are the same key.
            Value::Num(n) if *n == 0.0 => DocKey::Num(0.0),
            Value::Num(n) => DocKey::Num(*n),
            Value::Str(s) => DocKey::Str(s.clone()),
            other => DocKey::Ref(other.address().unwrap_or(0), other.clone()),
        }
    }
}

impl Ord for DocKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DocKey::Bool(a), DocKey::Bool(b)) => a.cmp(b),
            (DocKey::Num(a), DocKey::Num(b)) => a.total_cmp(b),
            (DocKey::Str(a), DocKey::Str(b)) => a.cmp(b),
            (DocKey::Ref(a, _), DocKey::Ref(b, _)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for DocKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DocKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DocKey {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Num(0.0).is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(Value::doc(Doc::new()).is_truthy());
    }

    #[test]
    fn primitives_compare_structurally() {
        assert_eq!(Value::from("ab"), Value::from(String::from("ab")));
        assert_eq!(Value::Num(1.0), Value::Num(1.0));
        assert_ne!(Value::Num(1.0), Value::from("1"));
        assert_ne!(Value::None, Value::Bool(false));
    }

    #[test]
    fn docs_compare_by_identity() {
        let a = Value::doc(Doc::new());
        let b = Value::doc(Doc::new());
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn keys_are_ordered_numerically() {
        let mut doc = Doc::new();
        for n in [10.0, 2.0, 0.0, 1.0] {
            doc.insert(Value::Num(n), Value::Num(n * 2.0));
        }
        let keys: Vec<f64> = doc.entries().filter_map(|(k, _)| k.as_num()).collect();
        assert_eq!(keys, vec![0.0, 1.0, 2.0, 10.0]);
    }

    #[test]
    fn negative_zero_is_zero_key() {
        let mut doc = Doc::new();
        doc.insert(Value::Num(-0.0), Value::from("x"));
        assert_eq!(doc.get(&Value::Num(0.0)), Some(Value::from("x")));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn reference_keys_use_identity() {
        let key = Value::doc(Doc::new());
        let other = Value::doc(Doc::new());
        let mut doc = Doc::new();
        doc.insert(key.clone(), Value::Num(1.0));
        assert_eq!(doc.get(&key), Some(Value::Num(1.0)));
        assert_eq!(doc.get(&other), None);
    }

    #[test]
    fn doc_prototype_capability() {
        let proto = Value::doc(Doc::new());
        let cell = RefCell::new(Doc::with_proto(proto.clone()));
        assert_eq!(cell.index(&Value::from("x")), Value::None);
        assert!(cell.set_index(Value::from("x"), Value::Num(3.0)).is_ok());
        assert_eq!(cell.index(&Value::from("x")), Value::Num(3.0));
        assert_eq!(cell.prototype(), Some(proto));
    }
}
