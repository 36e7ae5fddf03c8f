// Klass Class Handles
// A class owns two property scopes (static and instance-shape), a parent map per
// scope, its listener lists and the call frame used for static calls

pub mod accessors;
pub mod body;
pub mod listeners;
pub mod merge;
pub mod settings;

pub use body::{ClassBody, Keyword, KeywordKind, ParentRef, TraitRef};
pub use listeners::{ListenerList, ListenerRegistry, Phase};
pub use settings::{Settings, SettingsPatch};

use crate::error::{KlassError, KlassResult};
use crate::runtime::{CallFrame, Callable, Instance, PropertyMap, Receiver, Value};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Names owned by the framework. No merge path copies them and they are never
/// assigned as own properties.
pub const RESERVED_KEYS: &[&str] = &[
    "_self",
    "_parent",
    "_listener",
    "statics",
    "extends",
    "traits",
    "getCalledFunction",
    "getCalledFunctionContext",
    "getCalledFunctionContextName",
    "getCalledFunctionName",
    "callParent",
    "getParent",
    "extend",
    "extendParent",
    "extendClass",
    "extendKeywords",
    "extendSettings",
    "addListener",
    "removeListener",
    "getName",
    "setName",
    "setup",
    "logMessage",
];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Properties of the handle itself
    Static,
    /// Properties shared by every instance
    Prototype,
}

#[derive(Clone, Default)]
pub struct Scope {
    pub properties: PropertyMap,
    /// Inherited version of each key, last merged parent wins
    pub parents: PropertyMap,
}

pub(crate) struct ClassInner {
    name: RefCell<String>,
    settings: Cell<Settings>,
    statics: RefCell<Scope>,
    prototype: RefCell<Scope>,
    listeners: RefCell<ListenerRegistry>,
    parents: RefCell<Vec<ClassHandle>>,
    pub(crate) frame: RefCell<Option<CallFrame>>,
}

#[derive(Clone)]
pub struct ClassHandle(Rc<ClassInner>);

impl ClassHandle {
    /// Bare handle with default settings and empty scopes
    pub fn new(name: impl Into<String>) -> Self {
        ClassHandle(Rc::new(ClassInner {
            name: RefCell::new(name.into()),
            settings: Cell::new(Settings::default()),
            statics: RefCell::new(Scope::default()),
            prototype: RefCell::new(Scope::default()),
            listeners: RefCell::new(ListenerRegistry::default()),
            parents: RefCell::new(Vec::new()),
            frame: RefCell::new(None),
        }))
    }

    /// Like `new`, but refuses identifiers no class could be addressed by
    pub fn synthesize(id: &str) -> KlassResult<Self> {
        if id.trim().is_empty() {
            return Err(KlassError::argument_error("class identifier must not be blank")
                .with_help("pass a name or let the factory generate one"));
        }
        Ok(Self::new(id))
    }

    pub(crate) fn inner(&self) -> &ClassInner {
        &self.0
    }

    pub fn ptr_eq(&self, other: &ClassHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> String {
        self.0.name.borrow().clone()
    }

    /// Renames the handle. The registry keeps the identifier it was stored under.
    pub fn set_name(&self, id: impl Into<String>) {
        *self.0.name.borrow_mut() = id.into();
    }

    pub fn settings(&self) -> Settings {
        self.0.settings.get()
    }

    pub fn set_settings(&self, settings: Settings) {
        self.0.settings.set(settings);
    }

    /// Reset framework-owned state: settings, parent maps, parent list and listeners
    pub fn setup(&self) {
        self.0.settings.set(Settings::default());
        self.0.statics.borrow_mut().parents.clear();
        self.0.prototype.borrow_mut().parents.clear();
        self.0.parents.borrow_mut().clear();
        self.0.listeners.borrow_mut().clear();
    }

    fn scope(&self, scope: ScopeKind) -> &RefCell<Scope> {
        match scope {
            ScopeKind::Static => &self.0.statics,
            ScopeKind::Prototype => &self.0.prototype,
        }
    }

    pub fn property(&self, scope: ScopeKind, name: &str) -> Option<Value> {
        self.scope(scope).borrow().properties.get(name).cloned()
    }

    pub fn static_property(&self, name: &str) -> Option<Value> {
        self.property(ScopeKind::Static, name)
    }

    pub fn has_property(&self, scope: ScopeKind, name: &str) -> bool {
        self.scope(scope).borrow().properties.contains_key(name)
    }

    /// Raw assignment: no wrapping, no reserved-key filtering
    pub fn set_property(&self, scope: ScopeKind, name: impl Into<String>, value: Value) {
        self.scope(scope)
            .borrow_mut()
            .properties
            .insert(name.into(), value);
    }

    /// Snapshot of a scope's own properties
    pub fn properties(&self, scope: ScopeKind) -> PropertyMap {
        self.scope(scope).borrow().properties.clone()
    }

    pub fn parent_entry(&self, scope: ScopeKind, name: &str) -> Option<Value> {
        self.scope(scope).borrow().parents.get(name).cloned()
    }

    pub fn parent_entries(&self, scope: ScopeKind) -> PropertyMap {
        self.scope(scope).borrow().parents.clone()
    }

    /// Every parent merged into this class, in merge order
    pub fn parents(&self) -> Vec<ClassHandle> {
        self.0.parents.borrow().clone()
    }

    pub fn add_listener(&self, phase: Phase, name: &str, listener: Callable) {
        self.0.listeners.borrow_mut().add(phase, name, listener);
    }

    pub fn remove_listener(&self, phase: Phase, name: &str, listener: &Callable) {
        self.0.listeners.borrow_mut().remove(phase, name, listener);
    }

    /// Snapshot of the listeners for `name`, safe to run while listeners change
    pub fn listeners(&self, phase: Phase, name: &str) -> ListenerList {
        self.0.listeners.borrow().get(phase, name)
    }

    pub fn receiver(&self) -> Receiver {
        Receiver::Class(self.clone())
    }

    /// Static call: `this` is the handle itself
    pub fn call(&self, name: &str, args: &[Value]) -> KlassResult<Value> {
        self.receiver().call(name, args)
    }

    /// Create an instance and run its `create` method, if any, with `args`.
    /// An object-like value returned from `create` replaces the instance.
    pub fn construct(&self, args: &[Value]) -> KlassResult<Value> {
        let instance = Instance::new(self.clone());
        match instance.get("create") {
            Value::Function(create) => {
                let returned = create.invoke(&instance.receiver(), args)?;
                if returned.is_object_like() {
                    Ok(returned)
                } else {
                    Ok(Value::Instance(instance))
                }
            }
            _ => Ok(Value::Instance(instance)),
        }
    }

    /// `construct`, insisting on an instance as the outcome
    pub fn new_instance(&self, args: &[Value]) -> KlassResult<Instance> {
        match self.construct(args)? {
            Value::Instance(inst) => Ok(inst),
            other => Err(KlassError::type_error(format!(
                "create() of '{}' returned a {} instead of an instance",
                self.name(),
                other.type_name()
            ))),
        }
    }
}

impl fmt::Debug for ClassHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class {}>", self.name())
    }
}
