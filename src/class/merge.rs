// Klass Inheritance Merge
// Applies class bodies to a handle: settings, own properties, then structural keywords.
// Own properties override; parents and traits only fill absent keys.

use super::body::{ClassBody, Keyword, KeywordKind};
use super::{is_reserved, ClassHandle, ScopeKind};
use crate::copy::copy_into;
use crate::runtime::callable::wrap_method;
use crate::runtime::{PropertyMap, Value};

type KeywordHandler = fn(&ClassHandle, &Keyword);

/// Keywords run in this order within a body, whatever order they were written in
const KEYWORD_TABLE: [(KeywordKind, KeywordHandler); 3] = [
    (KeywordKind::Statics, apply_parents),
    (KeywordKind::Extends, apply_parents),
    (KeywordKind::Traits, apply_traits),
];

fn apply_parents(class: &ClassHandle, keyword: &Keyword) {
    if let Keyword::Statics(parents) | Keyword::Extends(parents) = keyword {
        let resolved: Vec<ClassHandle> = parents.iter().filter_map(|p| p.resolve()).collect();
        class.extend_parent(&resolved);
    }
}

fn apply_traits(class: &ClassHandle, keyword: &Keyword) {
    if let Keyword::Traits(sources) = keyword {
        for members in sources.iter().filter_map(|s| s.members()) {
            class.merge_trait(&members);
        }
    }
}

impl ClassHandle {
    pub fn extend_settings(&self, bodies: &[&ClassBody]) {
        for body in bodies {
            self.set_settings(body.settings.apply(self.settings()));
        }
    }

    /// Assign own instance-shape properties, replacing existing ones.
    /// Functions are stored behind the dispatch wrapper.
    pub fn extend_class(&self, bodies: &[&ClassBody]) {
        for body in bodies {
            for (name, value) in &body.properties {
                if is_reserved(name) {
                    continue;
                }
                let value = match value {
                    Value::Function(original) => {
                        Value::Function(wrap_method(self, name, original.clone()))
                    }
                    other => other.clone(),
                };
                self.set_property(ScopeKind::Prototype, name.as_str(), value);
            }
        }
    }

    pub fn extend_keywords(&self, bodies: &[&ClassBody]) {
        for body in bodies {
            for (kind, handler) in KEYWORD_TABLE.iter() {
                for keyword in body.keywords.iter().filter(|k| k.kind() == *kind) {
                    handler(self, keyword);
                }
            }
        }
    }

    /// Inherit from each parent in order. Keys the child lacks are copied, and
    /// every key's parent version is recorded for parent delegation. Copied
    /// functions that are not wrapped yet are wrapped with this class as their
    /// defining class.
    pub fn extend_parent(&self, parents: &[ClassHandle]) {
        for parent in parents {
            for scope in [ScopeKind::Static, ScopeKind::Prototype] {
                let inherited: Vec<(String, Value)> = parent
                    .properties(scope)
                    .into_iter()
                    .filter(|(key, _)| !is_reserved(key))
                    .collect();

                let mut missing = Vec::new();
                {
                    let mut target = self.scope(scope).borrow_mut();
                    for (key, value) in inherited {
                        if !target.properties.contains_key(&key) {
                            missing.push((key.clone(), value.clone()));
                        }
                        target.parents.insert(key, value);
                    }
                }

                for (key, value) in missing {
                    let value = self.adopt(&key, value);
                    self.set_property(scope, key, value);
                }
            }
            self.0.parents.borrow_mut().push(parent.clone());
        }
    }

    /// Bare functions get a wrapper defined by this class; anything else,
    /// including functions already wrapped elsewhere, is kept as is
    fn adopt(&self, keyword: &str, value: Value) -> Value {
        match value {
            Value::Function(function) if !function.is_wrapped() => {
                Value::Function(wrap_method(self, keyword, function))
            }
            other => other,
        }
    }

    /// Mix members into the instance-shape where absent. No wrapping and no
    /// parent entries: mixins take no part in interception or delegation.
    pub fn merge_trait(&self, members: &PropertyMap) {
        let mut target = self.scope(ScopeKind::Prototype).borrow_mut();
        for (key, value) in members {
            if is_reserved(key) {
                continue;
            }
            target
                .properties
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Shallow-copy bags onto the static scope, then fill in accessors.
    /// Copied functions become static methods of this class.
    pub fn extend(&self, sources: &[&PropertyMap], keep_nullish: bool) {
        {
            let mut target = self.scope(ScopeKind::Static).borrow_mut();
            copy_into(&mut target.properties, sources, keep_nullish);
            target.properties.retain(|key, _| !is_reserved(key));
        }

        for source in sources {
            for (key, value) in source.iter() {
                let Value::Function(function) = value else {
                    continue;
                };
                let stored = matches!(
                    self.static_property(key),
                    Some(Value::Function(ref current)) if current.ptr_eq(function)
                );
                if stored && !function.is_wrapped() {
                    let wrapped = self.adopt(key, value.clone());
                    self.set_property(ScopeKind::Static, key.as_str(), wrapped);
                }
            }
        }
        self.synthesize_accessors();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KlassResult;
    use crate::class::Phase;
    use crate::runtime::{Callable, Instance, Receiver};

    fn constant(name: &'static str) -> impl Fn(&Receiver, &[Value]) -> KlassResult<Value> {
        move |_, _| Ok(Value::from(name))
    }

    #[test]
    fn test_parent_fills_absent_and_records_every_key() {
        let parent = ClassHandle::new("Parent");
        parent.extend_class(&[&ClassBody::new()
            .method("shared", constant("parent"))
            .method("only_parent", constant("parent-only"))]);

        let child = ClassHandle::new("Child");
        child.extend_class(&[&ClassBody::new().method("shared", constant("child"))]);
        child.extend_parent(&[parent.clone()]);

        let inst = Instance::new(child.clone());
        assert_eq!(inst.call("shared", &[]).unwrap(), Value::from("child"));
        assert_eq!(inst.call("only_parent", &[]).unwrap(), Value::from("parent-only"));
        assert!(child.parent_entry(ScopeKind::Prototype, "shared").is_some());
        assert!(child.parent_entry(ScopeKind::Prototype, "only_parent").is_some());
        assert!(child.parents()[0].ptr_eq(&parent));
    }

    #[test]
    fn test_last_parent_wins_in_parent_map() {
        let first = ClassHandle::new("First");
        first.set_property(ScopeKind::Prototype, "tag", Value::from("first"));
        let second = ClassHandle::new("Second");
        second.set_property(ScopeKind::Prototype, "tag", Value::from("second"));

        let child = ClassHandle::new("Child");
        child.extend_parent(&[first, second]);

        assert_eq!(child.property(ScopeKind::Prototype, "tag"), Some(Value::from("first")));
        assert_eq!(
            child.parent_entry(ScopeKind::Prototype, "tag"),
            Some(Value::from("second"))
        );
    }

    #[test]
    fn test_static_scope_inherited_separately() {
        let parent = ClassHandle::new("Parent");
        parent.set_property(ScopeKind::Static, "VERSION", Value::Number(1.0));
        let child = ClassHandle::new("Child");
        child.extend_parent(&[parent]);

        assert_eq!(child.static_property("VERSION"), Some(Value::Number(1.0)));
        assert_eq!(child.property(ScopeKind::Prototype, "VERSION"), None);
    }

    #[test]
    fn test_reserved_keys_never_merge() {
        let parent = ClassHandle::new("Parent");
        parent.set_property(ScopeKind::Prototype, "_parent", Value::Null);
        parent.set_property(ScopeKind::Prototype, "getName", Value::Null);
        let child = ClassHandle::new("Child");
        child.extend_parent(&[parent]);
        child.extend_class(&[&ClassBody::new().property("_listener", 1)]);

        assert!(child.properties(ScopeKind::Prototype).is_empty());
    }

    #[test]
    fn test_traits_fill_only_and_stay_unwrapped() {
        let child = ClassHandle::new("Child");
        child.extend_class(&[&ClassBody::new().property("legs", 2)]);

        let mut mixin = PropertyMap::default();
        mixin.insert("legs".to_string(), Value::Number(4.0));
        mixin.insert(
            "walk".to_string(),
            Value::Function(Callable::native("walk", constant("walking"))),
        );
        child.merge_trait(&mixin);
        child.merge_trait(&mixin);

        assert_eq!(child.property(ScopeKind::Prototype, "legs"), Some(Value::Number(2.0)));
        let walk = child.property(ScopeKind::Prototype, "walk").unwrap();
        assert!(!walk.as_callable().unwrap().is_wrapped());
        assert!(child.parent_entry(ScopeKind::Prototype, "walk").is_none());
    }

    #[test]
    fn test_keyword_table_order_statics_extends_traits() {
        let base = ClassHandle::new("Base");
        base.set_property(ScopeKind::Prototype, "origin", Value::from("base"));

        let mut mixin = PropertyMap::default();
        mixin.insert("origin".to_string(), Value::from("trait"));

        let child = ClassHandle::new("Child");
        // Traits written first still run after extends
        child.extend_keywords(&[&ClassBody::new().traits(mixin).extends(base)]);

        assert_eq!(child.property(ScopeKind::Prototype, "origin"), Some(Value::from("base")));
    }

    #[test]
    fn test_extend_copies_statics_and_adds_accessors() {
        let class = ClassHandle::new("Config");
        let mut bag = PropertyMap::default();
        bag.insert("level".to_string(), Value::Number(3.0));
        bag.insert("empty".to_string(), Value::from(""));
        class.extend(&[&bag], false);

        assert_eq!(class.static_property("level"), Some(Value::Number(3.0)));
        assert_eq!(class.static_property("empty"), None);
        assert_eq!(class.call("getLevel", &[]).unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_inherited_bare_functions_are_wrapped_for_the_child() {
        let base = ClassHandle::new("SBase");
        base.set_property(
            ScopeKind::Static,
            "ping",
            Value::Function(Callable::native("ping", constant("pong"))),
        );
        let sub = ClassHandle::new("SSub");
        sub.extend_parent(&[base]);

        let ping = sub.static_property("ping").unwrap();
        assert!(ping.as_callable().unwrap().is_wrapped());
        assert!(!sub
            .parent_entry(ScopeKind::Static, "ping")
            .unwrap()
            .as_callable()
            .unwrap()
            .is_wrapped());

        assert_eq!(sub.call("ping", &[]).unwrap(), Value::from("pong"));
        sub.add_listener(
            Phase::Before,
            "ping",
            Callable::native("deny", |_, _| Ok(Value::Boolean(false))),
        );
        assert_eq!(sub.call("ping", &[]).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_already_wrapped_parent_methods_are_not_wrapped_twice() {
        let parent = ClassHandle::new("Parent");
        parent.extend_class(&[&ClassBody::new().method("run", constant("ran"))]);
        let child = ClassHandle::new("Child");
        child.extend_parent(&[parent.clone()]);

        assert_eq!(
            child.property(ScopeKind::Prototype, "run"),
            parent.property(ScopeKind::Prototype, "run")
        );
    }

    #[test]
    fn test_extend_wraps_static_functions() {
        let class = ClassHandle::new("Tools");
        let mut bag = PropertyMap::default();
        bag.insert(
            "whoami".to_string(),
            Value::Function(Callable::native("whoami", |this, _| {
                Ok(Value::from(this.called_function_name().unwrap_or_default()))
            })),
        );
        class.extend(&[&bag], false);

        let stored = class.static_property("whoami").unwrap();
        assert!(stored.as_callable().unwrap().is_wrapped());
        assert_eq!(class.call("whoami", &[]).unwrap(), Value::from("whoami"));
        assert!(class.receiver().current_frame().is_none());
    }
}
