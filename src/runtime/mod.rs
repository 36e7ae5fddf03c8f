pub mod callable;
pub mod frame;
pub mod instance;
pub mod receiver;
pub mod value;

pub use callable::{Callable, NativeFn, WrappedMethod};
pub use frame::CallFrame;
pub use instance::Instance;
pub use receiver::Receiver;
pub use value::{PropertyMap, Value};
