// Klass Class Factory
// Builds a named handle from class bodies, registers it and hands back the
// class (or its single instance)

use crate::class::{ClassBody, ClassHandle};
use crate::diagnostics;
use crate::registry;
use crate::runtime::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefineOptions {
    /// Replace a class already registered under the same identifier
    pub overwrite: bool,
}

/// `define_with` default options: an existing registration is left in place
pub fn define(id: Option<&str>, bodies: &[ClassBody]) -> Value {
    define_with(id, bodies, DefineOptions::default())
}

/// Build a class from `bodies`. Each body applies settings, then own
/// properties, then keywords; accessors are filled in once all bodies ran.
///
/// Returns the class, its instance when the class is a singleton, or an empty
/// object when the class cannot be built.
///
/// Without `overwrite`, redefining a registered identifier still builds and
/// returns a new class, but the registry keeps the earlier one.
pub fn define_with(id: Option<&str>, bodies: &[ClassBody], options: DefineOptions) -> Value {
    let id = match id {
        Some(id) => id.to_string(),
        None => registry::generate_id(),
    };

    let class = match ClassHandle::synthesize(&id) {
        Ok(class) => class,
        Err(err) => {
            diagnostics::log_error(None, &format!("[define {:?}] {}", id, err));
            return Value::empty_object();
        }
    };

    for body in bodies {
        class.extend_settings(&[body]);
        class.extend_class(&[body]);
        class.extend_keywords(&[body]);
    }
    class.synthesize_accessors();

    let stored = registry::register(&id, &class, options.overwrite);
    if class.settings().debug {
        let outcome = if stored { "registered" } else { "built, registry unchanged" };
        diagnostics::log_success(None, &format!("[define {}] {}", id, outcome));
    }

    if !class.settings().singleton {
        return Value::Class(class);
    }

    match class.construct(&[]) {
        Ok(instance) => instance,
        Err(err) => {
            diagnostics::log_error(
                Some(&class.receiver()),
                &format!("[singleton] {}", err.format()),
            );
            Value::empty_object()
        }
    }
}
