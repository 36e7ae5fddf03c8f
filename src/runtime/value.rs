// Klass Runtime Values
// Everything stored on a class, an instance or passed to a method is a Value
// Single-threaded: shared ownership through Rc, interior mutability through RefCell

use super::callable::Callable;
use super::instance::Instance;
use crate::class::ClassHandle;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Property bag keyed by property name
pub type PropertyMap = FxHashMap<String, Value>;

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    /// Plain property bag (trait objects, JSON objects, inert factory results)
    Object(Rc<RefCell<PropertyMap>>),
    Function(Callable),
    Class(ClassHandle),
    Instance(Instance),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(map: PropertyMap) -> Self {
        Value::Object(Rc::new(RefCell::new(map)))
    }

    pub fn empty_object() -> Self {
        Self::object(PropertyMap::default())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "Undefined",
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
            Value::Object(_) => "Object",
            Value::Function(_) => "Function",
            Value::Class(_) => "Class",
            Value::Instance(_) => "Instance",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// A listener answering exactly `false` vetoes the wrapped call
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Boolean(false))
    }

    /// Values that replace a fresh instance when returned from `create`
    pub fn is_object_like(&self) -> bool {
        matches!(
            self,
            Value::Array(_) | Value::Object(_) | Value::Function(_) | Value::Class(_) | Value::Instance(_)
        )
    }

    /// Length of strings (in chars) and arrays; other values have none
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(arr) => Some(arr.borrow().len()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassHandle> {
        match self {
            Value::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Instance(inst) => Some(inst),
            _ => None,
        }
    }

    /// One step of a dotted-path walk: a named member of this value, if present
    pub fn member(&self, name: &str) -> Option<Value> {
        match self {
            Value::Object(map) => map.borrow().get(name).cloned(),
            Value::Class(class) => class.static_property(name),
            Value::Instance(inst) => inst.lookup(name),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Class(a), Value::Class(b)) => a.ptr_eq(b),
            (Value::Instance(a), Value::Instance(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

thread_local! {
    /// Arrays and objects currently being displayed, innermost last
    static DISPLAYING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Display a container once per nesting chain; a container reached again
/// through itself prints as `[Circular]`
fn display_once(
    f: &mut fmt::Formatter<'_>,
    id: usize,
    body: impl FnOnce(&mut fmt::Formatter<'_>) -> fmt::Result,
) -> fmt::Result {
    if DISPLAYING.with(|d| d.borrow().contains(&id)) {
        return write!(f, "[Circular]");
    }
    DISPLAYING.with(|d| d.borrow_mut().push(id));
    let result = body(f);
    DISPLAYING.with(|d| d.borrow_mut().pop());
    result
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => {
                // The i64 cast saturates for large magnitudes
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Array(arr) => display_once(f, Rc::as_ptr(arr) as *const () as usize, |f| {
                let items: Vec<String> = arr.borrow().iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }),
            Value::Object(map) => display_once(f, Rc::as_ptr(map) as *const () as usize, |f| {
                let map = map.borrow();
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let items: Vec<String> = keys
                    .into_iter()
                    .map(|k| format!("\"{}\": {}", k, map[k]))
                    .collect();
                write!(f, "{{{}}}", items.join(", "))
            }),
            Value::Function(func) => write!(f, "<fn {}>", func.name()),
            Value::Class(class) => write!(f, "<class {}>", class.name()),
            Value::Instance(inst) => write!(f, "<{} instance>", inst.class().name()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Function(f)
    }
}

impl From<ClassHandle> for Value {
    fn from(class: ClassHandle) -> Self {
        Value::Class(class)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Instance(inst)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::empty_object().is_truthy());
    }

    #[test]
    fn test_only_false_vetoes() {
        assert!(Value::Boolean(false).is_false());
        assert!(!Value::Null.is_false());
        assert!(!Value::Number(0.0).is_false());
    }

    #[test]
    fn test_reference_equality() {
        let a = Value::empty_object();
        let b = Value::empty_object();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(Value::from("x"), Value::from("x"));
    }

    #[test]
    fn test_from_json_nests_members() {
        let value = Value::from(json!({"models": {"user": "u"}, "tags": ["a", 1]}));
        let user = value.member("models").and_then(|m| m.member("user"));
        assert_eq!(user, Some(Value::from("u")));
        assert_eq!(value.member("tags").and_then(|t| t.length()), Some(2));
        assert_eq!(value.member("missing"), None);
    }

    #[test]
    fn test_display_numbers() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(1.5).to_string(), "1.5");
        assert_eq!(Value::Number(-42.0).to_string(), "-42");
        assert_eq!(Value::Number(1e30).to_string(), "1000000000000000000000000000000");
    }

    #[test]
    fn test_display_self_containing_values() {
        let object = Value::empty_object();
        if let Value::Object(map) = &object {
            map.borrow_mut().insert("me".to_string(), object.clone());
        }
        assert_eq!(object.to_string(), "{\"me\": [Circular]}");

        let array = Value::array(vec![Value::Number(1.0)]);
        if let Value::Array(items) = &array {
            items.borrow_mut().push(array.clone());
        }
        assert_eq!(array.to_string(), "[1, [Circular]]");
    }

    #[test]
    fn test_shared_value_in_siblings_is_not_circular() {
        let shared = Value::array(vec![Value::Number(1.0)]);
        let outer = Value::array(vec![shared.clone(), shared]);
        assert_eq!(outer.to_string(), "[[1], [1]]");
    }
}
