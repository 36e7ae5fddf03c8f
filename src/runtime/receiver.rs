// Klass Receivers
// The `this` of a method call: a class handle for static calls, an instance otherwise

use super::callable::Callable;
use super::frame::CallFrame;
use super::instance::Instance;
use super::value::Value;
use crate::class::listeners::Phase;
use crate::class::{ClassHandle, ScopeKind};
use crate::diagnostics;
use crate::error::{KlassError, KlassResult};
use std::cell::RefCell;

#[derive(Clone)]
pub enum Receiver {
    Class(ClassHandle),
    Instance(Instance),
}

impl Receiver {
    /// The class whose listeners run for calls on this receiver
    pub fn class(&self) -> ClassHandle {
        match self {
            Receiver::Class(class) => class.clone(),
            Receiver::Instance(inst) => inst.class(),
        }
    }

    pub fn scope(&self) -> ScopeKind {
        match self {
            Receiver::Class(_) => ScopeKind::Static,
            Receiver::Instance(_) => ScopeKind::Prototype,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Receiver::Class(class) => Value::Class(class.clone()),
            Receiver::Instance(inst) => Value::Instance(inst.clone()),
        }
    }

    pub(crate) fn frame_slot(&self) -> &RefCell<Option<CallFrame>> {
        match self {
            Receiver::Class(class) => &class.inner().frame,
            Receiver::Instance(inst) => &inst.inner().frame,
        }
    }

    pub fn get(&self, name: &str) -> Value {
        match self {
            Receiver::Class(class) => class.static_property(name).unwrap_or(Value::Undefined),
            Receiver::Instance(inst) => inst.get(name),
        }
    }

    pub fn set(&self, name: &str, value: Value) {
        match self {
            Receiver::Class(class) => class.set_property(ScopeKind::Static, name, value),
            Receiver::Instance(inst) => inst.set(name, value),
        }
    }

    /// Look up `name` on the receiver and invoke it with the receiver as `this`
    pub fn call(&self, name: &str, args: &[Value]) -> KlassResult<Value> {
        match self.get(name) {
            Value::Function(method) => method.invoke(self, args),
            Value::Undefined => Err(KlassError::attribute_error(format!(
                "'{}' has no method '{}'",
                self.class().name(),
                name
            ))),
            other => Err(KlassError::type_error(format!(
                "'{}.{}' is a {}, not a function",
                self.class().name(),
                name,
                other.type_name()
            ))),
        }
    }

    pub fn add_listener(&self, phase: Phase, name: &str, listener: Callable) {
        self.class().add_listener(phase, name, listener);
    }

    pub fn remove_listener(&self, phase: Phase, name: &str, listener: &Callable) {
        self.class().remove_listener(phase, name, listener);
    }

    pub fn log_message(&self, parts: &[Value], error: bool) {
        diagnostics::log_message(Some(self), parts, error);
    }
}

impl From<ClassHandle> for Receiver {
    fn from(class: ClassHandle) -> Self {
        Receiver::Class(class)
    }
}

impl From<Instance> for Receiver {
    fn from(inst: Instance) -> Self {
        Receiver::Instance(inst)
    }
}
