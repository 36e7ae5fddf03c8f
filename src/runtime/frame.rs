// Klass Call Context
// One live frame per receiver, saved and restored around every wrapped call.
// Parent delegation resolves through the frame's defining class.

use super::callable::Callable;
use super::receiver::Receiver;
use super::value::Value;
use crate::class::ClassHandle;
use crate::error::{KlassError, KlassResult};

/// Which class and method is currently executing on a receiver
#[derive(Clone)]
pub struct CallFrame {
    pub context: ClassHandle,
    pub method_name: String,
    pub function: Callable,
}

impl CallFrame {
    pub fn new(context: ClassHandle, method_name: impl Into<String>, function: Callable) -> Self {
        Self {
            context,
            method_name: method_name.into(),
            function,
        }
    }
}

/// Installs a frame on a receiver and puts the previous one back when dropped,
/// so early returns and errors unwind the context too.
pub(crate) struct FrameGuard {
    receiver: Receiver,
    saved: Option<CallFrame>,
}

impl FrameGuard {
    pub(crate) fn enter(receiver: &Receiver, frame: CallFrame) -> Self {
        let saved = receiver.frame_slot().replace(Some(frame));
        Self {
            receiver: receiver.clone(),
            saved,
        }
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        *self.receiver.frame_slot().borrow_mut() = self.saved.take();
    }
}

impl Receiver {
    pub fn current_frame(&self) -> Option<CallFrame> {
        self.frame_slot().borrow().clone()
    }

    /// The inherited version of the executing method, looked up on the
    /// defining class rather than on the receiver's own class
    pub fn get_parent(&self) -> Option<Value> {
        let frame = self.current_frame()?;
        frame.context.parent_entry(self.scope(), &frame.method_name)
    }

    /// Call the inherited version of the executing method with `args`.
    /// The arguments of the current call are not forwarded implicitly.
    pub fn call_parent(&self, args: &[Value]) -> KlassResult<Value> {
        match self.get_parent() {
            None => Ok(Value::Undefined),
            Some(Value::Function(parent)) => parent.invoke(self, args),
            Some(other) => Err(KlassError::type_error(format!(
                "parent entry of '{}' is a {}, not a function",
                self.called_function_name().unwrap_or_default(),
                other.type_name()
            ))),
        }
    }

    pub fn called_function(&self) -> Option<Callable> {
        self.frame_slot().borrow().as_ref().map(|f| f.function.clone())
    }

    pub fn called_function_name(&self) -> Option<String> {
        self.frame_slot().borrow().as_ref().map(|f| f.method_name.clone())
    }

    pub fn called_function_context(&self) -> Option<ClassHandle> {
        self.frame_slot().borrow().as_ref().map(|f| f.context.clone())
    }

    pub fn called_function_context_name(&self) -> Option<String> {
        self.called_function_context().map(|c| c.name())
    }

    /// Name of the class whose method is executing, or of the receiver's class
    pub fn get_name(&self) -> String {
        self.called_function_context()
            .unwrap_or_else(|| self.class())
            .name()
    }

    pub fn set_name(&self, id: impl Into<String>) {
        self.called_function_context()
            .unwrap_or_else(|| self.class())
            .set_name(id);
    }
}
