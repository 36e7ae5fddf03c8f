// Klass Accessor Synthesis
// setX/getX for every value property that has no accessor of that name yet

use super::{is_reserved, ClassHandle, ScopeKind};
use crate::runtime::{Callable, Value};
use crate::template;

const SETTER_TEMPLATE: &str = "set%:olettersnumber,camelcase:keyword%";
const GETTER_TEMPLATE: &str = "get%:olettersnumber,camelcase:keyword%";

pub fn setter_name(keyword: &str) -> String {
    template::render(SETTER_TEMPLATE, &[("keyword", keyword)])
}

pub fn getter_name(keyword: &str) -> String {
    template::render(GETTER_TEMPLATE, &[("keyword", keyword)])
}

/// Stores its argument on `this` and returns `this` for chaining
fn make_setter(keyword: &str, name: &str) -> Callable {
    let keyword = keyword.to_string();
    Callable::native(name, move |this, args| {
        this.set(&keyword, args.first().cloned().unwrap_or(Value::Undefined));
        Ok(this.to_value())
    })
}

fn make_getter(keyword: &str, name: &str) -> Callable {
    let keyword = keyword.to_string();
    Callable::native(name, move |this, _| Ok(this.get(&keyword)))
}

impl ClassHandle {
    pub fn synthesize_accessors(&self) {
        if !self.settings().auto_accessors {
            return;
        }
        self.synthesize_scope_accessors(ScopeKind::Static);
        self.synthesize_scope_accessors(ScopeKind::Prototype);
    }

    fn synthesize_scope_accessors(&self, scope: ScopeKind) {
        let mut keywords: Vec<String> = self
            .properties(scope)
            .into_iter()
            .filter(|(_, value)| !value.is_function())
            .map(|(key, _)| key)
            .collect();
        keywords.sort();

        for keyword in keywords {
            let setter = setter_name(&keyword);
            if !is_reserved(&setter) && !self.has_property(scope, &setter) {
                self.set_property(scope, setter.clone(), Value::Function(make_setter(&keyword, &setter)));
            }

            let getter = getter_name(&keyword);
            if !is_reserved(&getter) && !self.has_property(scope, &getter) {
                self.set_property(scope, getter.clone(), Value::Function(make_getter(&keyword, &getter)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassBody;
    use crate::runtime::Instance;

    #[test]
    fn test_accessor_names() {
        assert_eq!(setter_name("name"), "setName");
        assert_eq!(getter_name("first_name"), "getFirstName");
        assert_eq!(setter_name("max-size2"), "setMaxSize2");
    }

    #[test]
    fn test_setter_chains_and_getter_reads_current_value() {
        let class = ClassHandle::new("Person");
        class.extend_class(&[&ClassBody::new().property("age", 30)]);
        class.synthesize_accessors();

        let inst = Instance::new(class);
        let returned = inst.call("setAge", &[Value::Number(31.0)]).unwrap();
        assert_eq!(returned, Value::Instance(inst.clone()));
        assert_eq!(inst.call("getAge", &[]).unwrap(), Value::Number(31.0));
        assert_eq!(inst.get("age"), Value::Number(31.0));
    }

    #[test]
    fn test_manual_accessor_wins() {
        let class = ClassHandle::new("Person");
        class.extend_class(&[&ClassBody::new()
            .property("age", 30)
            .method("getAge", |_, _| Ok(Value::from("secret")))]);
        class.synthesize_accessors();

        let inst = Instance::new(class);
        assert_eq!(inst.call("getAge", &[]).unwrap(), Value::from("secret"));
        assert!(inst.call("setAge", &[Value::Number(1.0)]).is_ok());
    }

    #[test]
    fn test_disabled_setting_generates_nothing() {
        let class = ClassHandle::new("Bare");
        class.extend_settings(&[&ClassBody::new().auto_accessors(false)]);
        class.extend_class(&[&ClassBody::new().property("age", 30)]);
        class.synthesize_accessors();
        assert!(!class.has_property(ScopeKind::Prototype, "getAge"));
    }

    #[test]
    fn test_reserved_accessor_names_are_skipped() {
        let class = ClassHandle::new("Labelled");
        class.extend_class(&[&ClassBody::new().property("name", "label")]);
        class.synthesize_accessors();
        assert!(!class.has_property(ScopeKind::Prototype, "getName"));
        assert!(!class.has_property(ScopeKind::Prototype, "setName"));
    }

    #[test]
    fn test_functions_get_no_accessors() {
        let class = ClassHandle::new("Runner");
        class.extend_class(&[&ClassBody::new().method("run", |_, _| Ok(Value::Null))]);
        class.synthesize_accessors();
        assert!(!class.has_property(ScopeKind::Prototype, "getRun"));
    }
}
