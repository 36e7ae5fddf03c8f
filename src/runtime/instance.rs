// Klass Instances
// Own fields first, then the class's instance-shape

use super::frame::CallFrame;
use super::receiver::Receiver;
use super::value::{PropertyMap, Value};
use crate::class::{ClassHandle, ScopeKind};
use crate::error::KlassResult;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct InstanceInner {
    class: ClassHandle,
    fields: RefCell<PropertyMap>,
    pub(crate) frame: RefCell<Option<CallFrame>>,
}

#[derive(Clone)]
pub struct Instance(Rc<InstanceInner>);

impl Instance {
    pub(crate) fn new(class: ClassHandle) -> Self {
        Instance(Rc::new(InstanceInner {
            class,
            fields: RefCell::new(PropertyMap::default()),
            frame: RefCell::new(None),
        }))
    }

    pub(crate) fn inner(&self) -> &InstanceInner {
        &self.0
    }

    pub fn class(&self) -> ClassHandle {
        self.0.class.clone()
    }

    pub fn receiver(&self) -> Receiver {
        Receiver::Instance(self.clone())
    }

    /// Own field, falling back to the class's instance-shape
    pub fn lookup(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.0.fields.borrow().get(name) {
            return Some(value.clone());
        }
        self.0.class.property(ScopeKind::Prototype, name)
    }

    pub fn get(&self, name: &str) -> Value {
        self.lookup(name).unwrap_or(Value::Undefined)
    }

    pub fn has_own(&self, name: &str) -> bool {
        self.0.fields.borrow().contains_key(name)
    }

    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.fields.borrow_mut().insert(name.into(), value);
    }

    pub fn call(&self, name: &str, args: &[Value]) -> KlassResult<Value> {
        self.receiver().call(name, args)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
