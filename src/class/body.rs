// Klass Class Bodies
// One bag of settings, own properties and structural keywords handed to the factory

use super::settings::SettingsPatch;
use super::{is_reserved, ClassHandle};
use crate::error::{KlassError, KlassResult};
use crate::registry;
use crate::runtime::{Callable, PropertyMap, Receiver, Value};

/// Where a parent class comes from
#[derive(Clone, Debug)]
pub enum ParentRef {
    Class(ClassHandle),
    /// Dotted path resolved through the registry when the keyword is applied
    Path(String),
}

impl ParentRef {
    /// `None` when the path does not name a class
    pub fn resolve(&self) -> Option<ClassHandle> {
        match self {
            ParentRef::Class(class) => Some(class.clone()),
            ParentRef::Path(path) => registry::get_class(path),
        }
    }
}

impl From<ClassHandle> for ParentRef {
    fn from(class: ClassHandle) -> Self {
        ParentRef::Class(class)
    }
}

impl From<&ClassHandle> for ParentRef {
    fn from(class: &ClassHandle) -> Self {
        ParentRef::Class(class.clone())
    }
}

impl From<&str> for ParentRef {
    fn from(path: &str) -> Self {
        ParentRef::Path(path.to_string())
    }
}

impl From<String> for ParentRef {
    fn from(path: String) -> Self {
        ParentRef::Path(path)
    }
}

/// Where mixin members come from
#[derive(Clone, Debug)]
pub enum TraitRef {
    Object(PropertyMap),
    /// The instance-shape of a class
    Class(ClassHandle),
    Path(String),
}

impl TraitRef {
    /// Members to mix in, or `None` when the source cannot be found
    pub fn members(&self) -> Option<PropertyMap> {
        match self {
            TraitRef::Object(map) => Some(map.clone()),
            TraitRef::Class(class) => Some(class.properties(super::ScopeKind::Prototype)),
            TraitRef::Path(path) => match registry::get(path)? {
                Value::Class(class) => Some(class.properties(super::ScopeKind::Prototype)),
                Value::Object(map) => Some(map.borrow().clone()),
                _ => None,
            },
        }
    }
}

impl From<PropertyMap> for TraitRef {
    fn from(map: PropertyMap) -> Self {
        TraitRef::Object(map)
    }
}

impl From<ClassHandle> for TraitRef {
    fn from(class: ClassHandle) -> Self {
        TraitRef::Class(class)
    }
}

impl From<&ClassHandle> for TraitRef {
    fn from(class: &ClassHandle) -> Self {
        TraitRef::Class(class.clone())
    }
}

impl From<&str> for TraitRef {
    fn from(path: &str) -> Self {
        TraitRef::Path(path.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordKind {
    Statics,
    Extends,
    Traits,
}

/// Structural directive of a class body
#[derive(Clone, Debug)]
pub enum Keyword {
    Statics(Vec<ParentRef>),
    Extends(Vec<ParentRef>),
    Traits(Vec<TraitRef>),
}

impl Keyword {
    pub fn kind(&self) -> KeywordKind {
        match self {
            Keyword::Statics(_) => KeywordKind::Statics,
            Keyword::Extends(_) => KeywordKind::Extends,
            Keyword::Traits(_) => KeywordKind::Traits,
        }
    }
}

#[derive(Clone, Default)]
pub struct ClassBody {
    pub settings: SettingsPatch,
    pub properties: Vec<(String, Value)>,
    pub keywords: Vec<Keyword>,
}

impl ClassBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn debug(mut self, on: bool) -> Self {
        self.settings.debug = Some(on);
        self
    }

    pub fn deep_logging(mut self, on: bool) -> Self {
        self.settings.deep_logging = Some(on);
        self
    }

    pub fn auto_accessors(mut self, on: bool) -> Self {
        self.settings.auto_accessors = Some(on);
        self
    }

    pub fn singleton(mut self, on: bool) -> Self {
        self.settings.singleton = Some(on);
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    pub fn method(
        self,
        name: &str,
        body: impl Fn(&Receiver, &[Value]) -> KlassResult<Value> + 'static,
    ) -> Self {
        self.property(name, Callable::native(name, body))
    }

    pub fn extends(self, parent: impl Into<ParentRef>) -> Self {
        self.keyword(Keyword::Extends(vec![parent.into()]))
    }

    pub fn statics(self, parent: impl Into<ParentRef>) -> Self {
        self.keyword(Keyword::Statics(vec![parent.into()]))
    }

    pub fn traits(self, source: impl Into<TraitRef>) -> Self {
        self.keyword(Keyword::Traits(vec![source.into()]))
    }

    pub fn keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    /// Lower a string-keyed JSON body. Setting names and keyword names are
    /// taken out; every other non-reserved key becomes a property.
    pub fn from_json(json: &serde_json::Value) -> KlassResult<Self> {
        let map = json.as_object().ok_or_else(|| {
            KlassError::type_error(format!("class body must be a JSON object, got {}", json))
        })?;

        let settings: SettingsPatch = serde_json::from_value(json.clone())
            .map_err(|e| KlassError::type_error(format!("invalid class settings: {}", e)))?;
        let mut body = ClassBody {
            settings,
            ..ClassBody::default()
        };

        for (key, value) in map {
            match key.as_str() {
                "debug" | "deepLoggingLevel" | "autoSetterGetter" | "singleton" => {}
                "statics" => body.keywords.push(Keyword::Statics(json_parents(value))),
                "extends" => body.keywords.push(Keyword::Extends(json_parents(value))),
                "traits" => body.keywords.push(Keyword::Traits(json_traits(value))),
                key if is_reserved(key) => {}
                key => body
                    .properties
                    .push((key.to_string(), Value::from(value.clone()))),
            }
        }

        Ok(body)
    }
}

fn json_parents(value: &serde_json::Value) -> Vec<ParentRef> {
    match value {
        serde_json::Value::String(path) => vec![ParentRef::Path(path.clone())],
        serde_json::Value::Array(items) => items.iter().flat_map(json_parents).collect(),
        _ => Vec::new(),
    }
}

fn json_traits(value: &serde_json::Value) -> Vec<TraitRef> {
    match value {
        serde_json::Value::String(path) => vec![TraitRef::Path(path.clone())],
        serde_json::Value::Array(items) => items.iter().flat_map(json_traits).collect(),
        serde_json::Value::Object(map) => vec![TraitRef::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect(),
        )],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_collects_in_order() {
        let body = ClassBody::new()
            .singleton(true)
            .property("a", 1)
            .property("b", "two")
            .extends("Base")
            .traits("Mixin");

        assert_eq!(body.settings.singleton, Some(true));
        assert_eq!(body.properties[0].0, "a");
        assert_eq!(body.properties[1].1, Value::from("two"));
        assert_eq!(body.keywords[0].kind(), KeywordKind::Extends);
        assert_eq!(body.keywords[1].kind(), KeywordKind::Traits);
    }

    #[test]
    fn test_from_json_splits_settings_keywords_and_properties() {
        let body = ClassBody::from_json(&json!({
            "autoSetterGetter": false,
            "extends": ["Animal", "Pet"],
            "traits": {"legs": 4},
            "_parent": {},
            "callParent": 1,
            "color": "brown"
        }))
        .unwrap();

        assert_eq!(body.settings.auto_accessors, Some(false));
        assert_eq!(body.properties.len(), 1);
        assert_eq!(body.properties[0], ("color".to_string(), Value::from("brown")));

        let extends = body
            .keywords
            .iter()
            .find(|k| k.kind() == KeywordKind::Extends)
            .unwrap();
        match extends {
            Keyword::Extends(parents) => assert_eq!(parents.len(), 2),
            _ => unreachable!(),
        }
        assert!(body.keywords.iter().any(|k| k.kind() == KeywordKind::Traits));
    }

    #[test]
    fn test_from_json_rejects_non_objects() {
        assert!(ClassBody::from_json(&json!(["nope"])).is_err());
    }

    #[test]
    fn test_unresolvable_path_is_none() {
        assert!(ParentRef::from("No.Such.Class").resolve().is_none());
        assert!(TraitRef::from("NoSuchTrait").members().is_none());
    }
}
