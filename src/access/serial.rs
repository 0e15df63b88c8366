//! Reconstruction of host types from tagged mappings.
//!
//! A serializable object is stored as a mapping whose [`TYPE_KEY`] entry
//! names its alias:
//!
//! ```yaml
//! spawn:
//!   ==: Location
//!   world: overworld
//!   x: 10
//! ```
//!
//! The host registers one reconstruction function per alias; reading looks
//! the alias up and hands the whole mapping to that function.

use std::any::Any;
use std::collections::HashMap;

use serde_yaml::{Mapping, Value};

use crate::document::{Document, DocumentError};

/// Key holding the alias of a serialized object.
pub const TYPE_KEY: &str = "==";

/// A host type that can be written as, and rebuilt from, a plain mapping.
pub trait ConfigSerializable: Sized + 'static {
    /// Name written under [`TYPE_KEY`].
    const ALIAS: &'static str;

    fn to_mapping(&self) -> Mapping;

    fn from_mapping(map: &Mapping) -> Result<Self, DocumentError>;
}

type Reconstruct = fn(&Mapping) -> Result<Box<dyn Any>, DocumentError>;

fn reconstruct<T: ConfigSerializable>(map: &Mapping) -> Result<Box<dyn Any>, DocumentError> {
    T::from_mapping(map).map(|value| Box::new(value) as Box<dyn Any>)
}

/// Serialized form of `value`: its alias under [`TYPE_KEY`], then its fields.
pub fn to_tagged<T: ConfigSerializable>(value: &T) -> Mapping {
    let mut tagged = Mapping::new();
    tagged.insert(Value::from(TYPE_KEY), Value::from(T::ALIAS));
    for (key, field) in value.to_mapping() {
        if key.as_str() != Some(TYPE_KEY) {
            tagged.insert(key, field);
        }
    }
    tagged
}

/// Alias to reconstruction function table, populated by the host.
#[derive(Default, Clone)]
pub struct SerializationRegistry {
    factories: HashMap<String, Reconstruct>,
}

impl std::fmt::Debug for SerializationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut aliases: Vec<_> = self.factories.keys().collect();
        aliases.sort();
        f.debug_struct("SerializationRegistry")
            .field("aliases", &aliases)
            .finish()
    }
}

impl SerializationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` under its alias, replacing any earlier registration.
    pub fn register<T: ConfigSerializable>(&mut self) -> &mut Self {
        self.factories.insert(T::ALIAS.to_string(), reconstruct::<T>);
        self
    }

    pub fn is_registered(&self, alias: &str) -> bool {
        self.factories.contains_key(alias)
    }

    /// Rebuilds whatever type the mapping's alias names.
    pub fn deserialize(&self, map: &Mapping) -> Result<Box<dyn Any>, DocumentError> {
        let alias = map
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .ok_or(DocumentError::UntaggedMapping)?;
        let factory = self
            .factories
            .get(alias)
            .ok_or_else(|| DocumentError::UnknownAlias(alias.to_string()))?;
        factory(map)
    }

    /// Reads the object at `path` as a `T`.
    ///
    /// `Ok(None)` when nothing is stored there. A stored value that is not a
    /// tagged mapping, names an unregistered alias, or rebuilds into a
    /// different type is an error.
    pub fn get<T: ConfigSerializable>(
        &self,
        document: &Document,
        path: &str,
    ) -> Result<Option<T>, DocumentError> {
        let Some(value) = document.get(path) else {
            return Ok(None);
        };
        let map = value
            .as_mapping()
            .ok_or_else(|| DocumentError::NotASection(path.to_string()))?;
        if map.get(TYPE_KEY).is_none() {
            return Err(DocumentError::MissingTypeKey(path.to_string()));
        }

        let object = self.deserialize(map)?;
        object
            .downcast::<T>()
            .map(|boxed| Some(*boxed))
            .map_err(|_| DocumentError::TypeMismatch {
                path: path.to_string(),
                expected: T::ALIAS,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ConfigAccess;

    #[derive(Debug, PartialEq)]
    struct Location {
        world: String,
        x: i64,
    }

    impl ConfigSerializable for Location {
        const ALIAS: &'static str = "Location";

        fn to_mapping(&self) -> Mapping {
            let mut map = Mapping::new();
            map.insert("world".into(), self.world.clone().into());
            map.insert("x".into(), self.x.into());
            map
        }

        fn from_mapping(map: &Mapping) -> Result<Self, DocumentError> {
            let world = map
                .get("world")
                .and_then(Value::as_str)
                .ok_or_else(|| DocumentError::InvalidField {
                    field: "world".into(),
                    message: "expected a string".into(),
                })?;
            let x = map
                .get("x")
                .and_then(Value::as_i64)
                .ok_or_else(|| DocumentError::InvalidField {
                    field: "x".into(),
                    message: "expected an integer".into(),
                })?;
            Ok(Location {
                world: world.to_string(),
                x,
            })
        }
    }

    #[derive(Debug)]
    struct Marker;

    impl ConfigSerializable for Marker {
        const ALIAS: &'static str = "Marker";

        fn to_mapping(&self) -> Mapping {
            Mapping::new()
        }

        fn from_mapping(_: &Mapping) -> Result<Self, DocumentError> {
            Ok(Marker)
        }
    }

    fn spawn() -> Location {
        Location {
            world: "overworld".into(),
            x: 10,
        }
    }

    #[test]
    fn test_tagged_form_leads_with_alias() {
        let tagged = to_tagged(&spawn());
        let keys: Vec<_> = tagged.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, [TYPE_KEY, "world", "x"]);
        assert_eq!(tagged.get(TYPE_KEY), Some(&Value::from("Location")));
    }

    #[test]
    fn test_registered_type_round_trips_through_document() {
        let mut registry = SerializationRegistry::new();
        registry.register::<Location>();
        assert!(registry.is_registered("Location"));

        let mut doc = Document::new();
        doc.set_serializable("spawn", &spawn());

        assert_eq!(registry.get::<Location>(&doc, "spawn").unwrap(), Some(spawn()));
        assert_eq!(registry.get::<Location>(&doc, "missing").unwrap(), None);
    }

    #[test]
    fn test_survives_yaml_text() {
        let mut registry = SerializationRegistry::new();
        registry.register::<Location>();

        let mut doc = Document::new();
        doc.set_serializable("spawn", &spawn());
        let reparsed = Document::parse(&doc.to_yaml_string().unwrap()).unwrap();

        assert_eq!(registry.get::<Location>(&reparsed, "spawn").unwrap(), Some(spawn()));
    }

    #[test]
    fn test_unregistered_alias_and_type_mismatch() {
        let mut registry = SerializationRegistry::new();
        let mut doc = Document::new();
        doc.set_serializable("spawn", &spawn());
        doc.set("plain", "text");

        assert!(matches!(
            registry.get::<Location>(&doc, "spawn"),
            Err(DocumentError::UnknownAlias(alias)) if alias == "Location"
        ));

        registry.register::<Location>().register::<Marker>();
        assert!(matches!(
            registry.get::<Marker>(&doc, "spawn"),
            Err(DocumentError::TypeMismatch { expected: "Marker", .. })
        ));
        assert!(matches!(
            registry.get::<Location>(&doc, "plain"),
            Err(DocumentError::NotASection(_))
        ));
    }

    #[test]
    fn test_reconstruction_errors_propagate() {
        let mut registry = SerializationRegistry::new();
        registry.register::<Location>();

        let mut broken = Mapping::new();
        broken.insert(TYPE_KEY.into(), "Location".into());
        broken.insert("world".into(), 5.into());

        assert!(matches!(
            registry.deserialize(&broken),
            Err(DocumentError::InvalidField { field, .. }) if field == "world"
        ));
    }

    #[test]
    fn test_missing_type_key_names_the_path_when_known() {
        let mut registry = SerializationRegistry::new();
        registry.register::<Location>();
        let mut doc = Document::new();
        doc.set("spawn.world", "overworld");

        let err = registry.deserialize(&spawn().to_mapping()).unwrap_err();
        assert!(matches!(err, DocumentError::UntaggedMapping));
        assert_eq!(err.to_string(), "mapping has no '==' type key");

        let err = registry.get::<Location>(&doc, "spawn").unwrap_err();
        assert_eq!(err.to_string(), "serialized object at 'spawn' has no '==' type key");
    }
}
