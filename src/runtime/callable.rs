// Klass Callables
// Native closures and the interception wrapper every class method is stored behind

use super::frame::{CallFrame, FrameGuard};
use super::receiver::Receiver;
use super::value::Value;
use crate::class::listeners::Phase;
use crate::class::ClassHandle;
use crate::diagnostics;
use crate::error::{KlassResult, StackFrame};
use std::fmt;
use std::rc::Rc;

/// Native method type (receiver + args -> result)
pub type NativeFn = dyn Fn(&Receiver, &[Value]) -> KlassResult<Value>;

pub struct NativeFunction {
    pub name: String,
    func: Box<NativeFn>,
}

/// A method as stored on a class: the original body plus the class that defined it.
/// Copies made by parent merges and traits keep the defining class alive, so it
/// outlives re-definition or removal from the registry.
pub struct WrappedMethod {
    pub keyword: String,
    pub original: Callable,
    base: ClassHandle,
}

#[derive(Clone)]
pub enum Callable {
    Native(Rc<NativeFunction>),
    Wrapped(Rc<WrappedMethod>),
}

impl Callable {
    pub fn native(
        name: impl Into<String>,
        func: impl Fn(&Receiver, &[Value]) -> KlassResult<Value> + 'static,
    ) -> Self {
        Callable::Native(Rc::new(NativeFunction {
            name: name.into(),
            func: Box::new(func),
        }))
    }

    pub fn name(&self) -> &str {
        match self {
            Callable::Native(native) => &native.name,
            Callable::Wrapped(wrapped) => &wrapped.keyword,
        }
    }

    pub fn is_wrapped(&self) -> bool {
        matches!(self, Callable::Wrapped(_))
    }

    /// The body behind one layer of wrapping
    pub fn original(&self) -> &Callable {
        match self {
            Callable::Native(_) => self,
            Callable::Wrapped(wrapped) => &wrapped.original,
        }
    }

    /// Identity comparison, used to remove listeners
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Wrapped(a), Callable::Wrapped(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn invoke(&self, this: &Receiver, args: &[Value]) -> KlassResult<Value> {
        match self {
            Callable::Native(native) => (native.func)(this, args),
            Callable::Wrapped(wrapped) => wrapped.dispatch(this, args),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(native) => write!(f, "<fn {}>", native.name),
            Callable::Wrapped(wrapped) => write!(f, "<method {}>", wrapped.keyword),
        }
    }
}

impl WrappedMethod {
    pub fn base(&self) -> &ClassHandle {
        &self.base
    }

    fn dispatch(&self, this: &Receiver, args: &[Value]) -> KlassResult<Value> {
        let basename = self.base.name();

        self.run(this, args, &self.base, &basename).map_err(|mut err| {
            err.push_frame(StackFrame::new(basename.clone(), self.keyword.clone()));
            err
        })
    }

    fn run(
        &self,
        this: &Receiver,
        args: &[Value],
        base: &ClassHandle,
        basename: &str,
    ) -> KlassResult<Value> {
        let _frame = FrameGuard::enter(
            this,
            CallFrame::new(base.clone(), self.keyword.clone(), self.original.clone()),
        );

        let class = this.class();
        let mut hook_args = vec![
            Value::string(&self.keyword),
            Value::Function(self.original.clone()),
            Value::Class(base.clone()),
            Value::string(basename),
        ];

        let mut vetoed = false;
        for listener in class.listeners(Phase::Before, &self.keyword) {
            if listener.invoke(this, &hook_args)?.is_false() {
                vetoed = true;
                break;
            }
        }

        let result = if vetoed {
            Value::Undefined
        } else {
            self.original.invoke(this, args)?
        };

        hook_args.push(result.clone());
        for listener in class.listeners(Phase::After, &self.keyword) {
            listener.invoke(this, &hook_args)?;
        }

        Ok(result)
    }
}

/// Wrap `original` as method `keyword` of `base`.
/// Debug classes also get a start/returns trace registered for the method.
pub fn wrap_method(base: &ClassHandle, keyword: &str, original: Callable) -> Callable {
    if base.settings().debug {
        base.add_listener(
            Phase::Before,
            keyword,
            Callable::native("debug:start", |this, _| {
                diagnostics::log_message(Some(this), &[Value::from("start")], false);
                Ok(Value::Undefined)
            }),
        );
        base.add_listener(
            Phase::After,
            keyword,
            Callable::native("debug:returns", |this, args| {
                let result = args.get(4).cloned().unwrap_or(Value::Undefined);
                diagnostics::log_message(Some(this), &[Value::from("returns:"), result], false);
                Ok(Value::Undefined)
            }),
        );
    }

    Callable::Wrapped(Rc::new(WrappedMethod {
        keyword: keyword.to_string(),
        original,
        base: base.clone(),
    }))
}
