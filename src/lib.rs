// Klass
// Class synthesis and method dispatch: named classes built from property bags,
// merged parents and traits, intercepted methods and parent delegation

pub mod class;
pub mod copy;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod registry;
pub mod runtime;
pub mod template;

pub use class::{
    ClassBody, ClassHandle, Keyword, ParentRef, Phase, ScopeKind, Settings, SettingsPatch,
    TraitRef,
};
pub use error::{ErrorKind, KlassError, KlassResult, StackFrame};
pub use factory::{define, define_with, DefineOptions};
pub use registry::{get, get_with_delimiter};
pub use runtime::{Callable, CallFrame, Instance, PropertyMap, Receiver, Value};
