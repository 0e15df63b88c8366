//! Typed accessors over a [`Document`].
//!
//! [`ConfigAccess`] turns the untyped value tree into typed reads and
//! writes. Every getter without a fallback parameter returns `Option`: `None`
//! means the path is absent or its value does not convert, and a stored zero,
//! `false` or empty list is reported as present.

mod coerce;
mod serial;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::document::{Document, DocumentError};

pub use serial::{ConfigSerializable, SerializationRegistry, TYPE_KEY};

/// Typed read/write access to the current document.
///
/// Implementors only hand out their document; every accessor is provided.
/// Reads resolve explicit values first and fall back to defaults.
pub trait ConfigAccess {
    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    fn get(&self, path: &str) -> Option<&Value> {
        self.document().get(path)
    }

    fn get_or(&self, path: &str, default: Value) -> Value {
        self.get(path).cloned().unwrap_or(default)
    }

    fn set(&mut self, path: &str, value: impl Into<Value>) {
        self.document_mut().set(path, value);
    }

    fn remove(&mut self, path: &str) -> Option<Value> {
        self.document_mut().remove(path)
    }

    fn contains(&self, path: &str) -> bool {
        self.document().contains(path)
    }

    fn contains_explicit(&self, path: &str) -> bool {
        self.document().contains_explicit(path)
    }

    fn is_set(&self, path: &str) -> bool {
        self.document().is_set(path)
    }

    fn keys(&self, deep: bool) -> Vec<String> {
        self.document().keys(deep)
    }

    fn values(&self, deep: bool) -> Mapping {
        self.document().values(deep)
    }

    fn create_section(&mut self, path: &str) -> &mut Mapping {
        self.document_mut().create_section(path)
    }

    fn create_section_with(&mut self, path: &str, values: &Mapping) -> &mut Mapping {
        self.document_mut().create_section_with(path, values)
    }

    fn get_section(&self, path: &str) -> Option<&Mapping> {
        self.get(path).and_then(Value::as_mapping)
    }

    fn is_section(&self, path: &str) -> bool {
        self.get_section(path).is_some()
    }

    fn get_string(&self, path: &str) -> Option<String> {
        self.get(path).and_then(coerce::to_string)
    }

    fn get_string_or(&self, path: &str, default: &str) -> String {
        self.get_string(path).unwrap_or_else(|| default.to_string())
    }

    fn is_string(&self, path: &str) -> bool {
        matches!(self.get(path), Some(Value::String(_)))
    }

    fn get_int(&self, path: &str) -> Option<i32> {
        self.get(path).and_then(coerce::to_i32)
    }

    fn get_int_or(&self, path: &str, default: i32) -> i32 {
        self.get_int(path).unwrap_or(default)
    }

    fn is_int(&self, path: &str) -> bool {
        self.get(path).is_some_and(coerce::is_i32)
    }

    fn get_long(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(coerce::to_i64)
    }

    fn get_long_or(&self, path: &str, default: i64) -> i64 {
        self.get_long(path).unwrap_or(default)
    }

    fn is_long(&self, path: &str) -> bool {
        self.get(path).is_some_and(coerce::is_i64)
    }

    fn get_double(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(coerce::to_f64)
    }

    fn get_double_or(&self, path: &str, default: f64) -> f64 {
        self.get_double(path).unwrap_or(default)
    }

    fn is_double(&self, path: &str) -> bool {
        self.get(path).is_some_and(coerce::is_f64)
    }

    fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(Value::as_bool)
    }

    fn get_bool_or(&self, path: &str, default: bool) -> bool {
        self.get_bool(path).unwrap_or(default)
    }

    fn is_bool(&self, path: &str) -> bool {
        matches!(self.get(path), Some(Value::Bool(_)))
    }

    fn get_list(&self, path: &str) -> Option<Vec<Value>> {
        self.get(path).and_then(Value::as_sequence).cloned()
    }

    fn get_list_or(&self, path: &str, default: Vec<Value>) -> Vec<Value> {
        self.get_list(path).unwrap_or(default)
    }

    fn is_list(&self, path: &str) -> bool {
        matches!(self.get(path), Some(Value::Sequence(_)))
    }

    fn get_string_list(&self, path: &str) -> Option<Vec<String>> {
        coerce::list_of(self.get(path)?, coerce::element_string)
    }

    fn get_integer_list(&self, path: &str) -> Option<Vec<i32>> {
        coerce::list_of(self.get(path)?, coerce::element_integral::<i32>)
    }

    fn get_long_list(&self, path: &str) -> Option<Vec<i64>> {
        coerce::list_of(self.get(path)?, coerce::element_integral::<i64>)
    }

    fn get_short_list(&self, path: &str) -> Option<Vec<i16>> {
        coerce::list_of(self.get(path)?, coerce::element_integral::<i16>)
    }

    fn get_byte_list(&self, path: &str) -> Option<Vec<i8>> {
        coerce::list_of(self.get(path)?, coerce::element_integral::<i8>)
    }

    fn get_double_list(&self, path: &str) -> Option<Vec<f64>> {
        coerce::list_of(self.get(path)?, coerce::element_f64)
    }

    fn get_float_list(&self, path: &str) -> Option<Vec<f32>> {
        coerce::list_of(self.get(path)?, coerce::element_f32)
    }

    fn get_boolean_list(&self, path: &str) -> Option<Vec<bool>> {
        coerce::list_of(self.get(path)?, coerce::element_bool)
    }

    fn get_char_list(&self, path: &str) -> Option<Vec<char>> {
        coerce::list_of(self.get(path)?, coerce::element_char)
    }

    fn get_map_list(&self, path: &str) -> Option<Vec<Mapping>> {
        coerce::list_of(self.get(path)?, coerce::element_mapping)
    }

    /// Deserializes the value at `path`. `None` when absent or not a `T`.
    fn get_object<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        self.try_get_object(path).ok().flatten()
    }

    fn get_object_or<T: DeserializeOwned>(&self, path: &str, default: T) -> T {
        self.get_object(path).unwrap_or(default)
    }

    /// Deserializes the value at `path`, reporting why a present value is not a `T`.
    fn try_get_object<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, DocumentError> {
        let Some(value) = self.get(path) else {
            return Ok(None);
        };
        serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|e| DocumentError::Deserialize {
                path: path.to_string(),
                source: e,
            })
    }

    /// Serializes `value` with serde and stores it at `path`.
    fn set_object<T: Serialize + ?Sized>(&mut self, path: &str, value: &T) -> Result<(), DocumentError> {
        let value = serde_yaml::to_value(value)?;
        self.set(path, value);
        Ok(())
    }

    /// Stores `value` in its tagged form so a [`SerializationRegistry`] can
    /// rebuild it.
    fn set_serializable<T: ConfigSerializable>(&mut self, path: &str, value: &T) {
        self.set(path, serial::to_tagged(value));
    }

    fn add_default(&mut self, path: &str, value: impl Into<Value>) {
        self.document_mut().add_default(path, value);
    }

    fn defaults(&self) -> &Mapping {
        self.document().defaults()
    }

    fn get_comments(&self, path: &str) -> Option<Vec<String>> {
        self.document().comments(path).map(<[String]>::to_vec)
    }

    fn set_comments(&mut self, path: &str, lines: Vec<String>) {
        self.document_mut().set_comments(path, lines);
    }

    fn get_inline_comments(&self, path: &str) -> Option<Vec<String>> {
        self.document().inline_comments(path).map(<[String]>::to_vec)
    }

    fn set_inline_comments(&mut self, path: &str, lines: Vec<String>) {
        self.document_mut().set_inline_comments(path, lines);
    }
}

impl ConfigAccess for Document {
    fn document(&self) -> &Document {
        self
    }

    fn document_mut(&mut self) -> &mut Document {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn doc(yaml: &str) -> Document {
        Document::parse(yaml).unwrap()
    }

    #[test]
    fn test_string_getters_distinguish_absent_from_fallback() {
        let doc = doc("name: app\n");
        assert_eq!(doc.get_string("name"), Some("app".to_string()));
        assert_eq!(doc.get_string("missing"), None);
        assert_eq!(doc.get_string_or("missing", "fallback"), "fallback");
        assert_eq!(doc.get_string_or("name", "fallback"), "app");
    }

    #[test]
    fn test_stored_zero_is_present() {
        // A stored zero is `Some(0)`; only an absent or non-numeric value is `None`.
        let doc = doc("zero: 0\nzerof: 0.0\nflag: false\ntext: abc\n");
        assert_eq!(doc.get_int("zero"), Some(0));
        assert_eq!(doc.get_long("zero"), Some(0));
        assert_eq!(doc.get_double("zerof"), Some(0.0));
        assert_eq!(doc.get_bool("flag"), Some(false));
        assert_eq!(doc.get_int("missing"), None);
        assert_eq!(doc.get_int("text"), None);
        assert_eq!(doc.get_int_or("missing", 7), 7);
    }

    #[test]
    fn test_type_predicates() {
        let doc = doc("s: x\ni: 1\nbig: 10000000000\nd: 1.5\nb: true\nl: [1]\nm: {k: v}\n");
        assert!(doc.is_string("s") && !doc.is_string("i"));
        assert!(doc.is_int("i") && !doc.is_int("big"));
        assert!(doc.is_long("big"));
        assert!(doc.is_double("d") && !doc.is_double("i"));
        assert!(doc.is_bool("b"));
        assert!(doc.is_list("l"));
        assert!(doc.is_section("m") && !doc.is_section("s"));
    }

    #[test]
    fn test_getters_fall_back_to_defaults() {
        let mut doc = Document::new();
        doc.add_default("retries", 3);
        assert_eq!(doc.get_int("retries"), Some(3));
        doc.set("retries", 5);
        assert_eq!(doc.get_int("retries"), Some(5));
    }

    #[test]
    fn test_list_accessors_round_trip() {
        let mut doc = Document::new();
        doc.set_object("strings", &["a", "b"]).unwrap();
        doc.set_object("integers", &[1, -2, 3]).unwrap();
        doc.set_object("booleans", &[true, false]).unwrap();
        doc.set_object("doubles", &[1.5, -0.25]).unwrap();
        doc.set_object("floats", &[0.5f32, 2.0]).unwrap();
        doc.set_object("longs", &[10_000_000_000i64, -1]).unwrap();
        doc.set_object("bytes", &[-128i8, 127]).unwrap();
        doc.set_object("chars", &['x', 'ß']).unwrap();
        doc.set_object("shorts", &[-32768i16, 32767]).unwrap();

        let mut entry = Mapping::new();
        entry.insert("name".into(), "one".into());
        doc.set("maps", Value::Sequence(vec![Value::Mapping(entry.clone())]));

        assert_eq!(doc.get_string_list("strings"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(doc.get_integer_list("integers"), Some(vec![1, -2, 3]));
        assert_eq!(doc.get_boolean_list("booleans"), Some(vec![true, false]));
        assert_eq!(doc.get_double_list("doubles"), Some(vec![1.5, -0.25]));
        assert_eq!(doc.get_float_list("floats"), Some(vec![0.5, 2.0]));
        assert_eq!(doc.get_long_list("longs"), Some(vec![10_000_000_000, -1]));
        assert_eq!(doc.get_byte_list("bytes"), Some(vec![-128, 127]));
        assert_eq!(doc.get_char_list("chars"), Some(vec!['x', 'ß']));
        assert_eq!(doc.get_short_list("shorts"), Some(vec![-32768, 32767]));
        assert_eq!(doc.get_map_list("maps"), Some(vec![entry]));
    }

    #[test]
    fn test_list_accessors_report_absent_paths() {
        let doc = doc("empty: []\n");
        assert_eq!(doc.get_string_list("missing"), None);
        assert_eq!(doc.get_integer_list("missing"), None);
        assert_eq!(doc.get_map_list("missing"), None);
        assert_eq!(doc.get_string_list("empty"), Some(Vec::new()));
        assert_eq!(doc.get_list_or("missing", vec![Value::from(1)]), vec![Value::from(1)]);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Endpoint {
        host: String,
        port: u16,
    }

    #[test]
    fn test_object_round_trip_and_mismatch() {
        let mut doc = Document::new();
        let endpoint = Endpoint {
            host: "example.com".into(),
            port: 443,
        };
        doc.set_object("endpoint", &endpoint).unwrap();
        doc.set("broken", "not an endpoint");

        assert_eq!(doc.get_object::<Endpoint>("endpoint"), Some(endpoint));
        assert_eq!(doc.get_object::<Endpoint>("broken"), None);
        assert!(matches!(
            doc.try_get_object::<Endpoint>("broken"),
            Err(DocumentError::Deserialize { .. })
        ));
        assert_eq!(doc.get_string("endpoint.host"), Some("example.com".into()));
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    enum Mode {
        Fast { level: u8 },
        Fixed(Vec<String>),
        Off,
    }

    #[test]
    fn test_enum_objects_survive_yaml_text() {
        let mut doc = Document::new();
        doc.set_object("server.mode", &Mode::Fast { level: 3 }).unwrap();
        doc.set_object("server.fallback", &Mode::Fixed(vec!["a".into(), "b".into()]))
            .unwrap();
        doc.set_object("idle", &Mode::Off).unwrap();
        doc.set("after", 1);

        let text = doc.to_yaml_string().unwrap();
        assert!(text.contains("  mode: !Fast\n    level: 3\n"), "{text}");

        let reparsed = Document::parse(&text).unwrap();
        assert_eq!(reparsed.get_object("server.mode"), Some(Mode::Fast { level: 3 }));
        assert_eq!(
            reparsed.get_object("server.fallback"),
            Some(Mode::Fixed(vec!["a".into(), "b".into()]))
        );
        assert_eq!(reparsed.get_object("idle"), Some(Mode::Off));
        assert_eq!(reparsed.get_int("after"), Some(1));
        assert_eq!(reparsed.keys(false), ["server", "idle", "after"]);
    }

    #[test]
    fn test_comments_round_trip() {
        let mut doc = Document::new();
        doc.set_comments("path", vec!["comment".into()]);
        doc.set_inline_comments("path", vec!["comment".into()]);
        assert_eq!(doc.get_comments("path"), Some(vec!["comment".to_string()]));
        assert_eq!(doc.get_inline_comments("path"), Some(vec!["comment".to_string()]));
        assert_eq!(doc.get_comments("other"), None);
    }

    #[test]
    fn test_sections() {
        let mut doc = Document::new();
        doc.create_section_with("section", &serde_yaml::from_str("example: example1\n").unwrap());
        assert_eq!(doc.get_string("section.example"), Some("example1".into()));
        assert_eq!(doc.get_section("section").map(Mapping::len), Some(1));

        doc.create_section("section");
        assert_eq!(doc.get_section("section").map(Mapping::len), Some(0));
        assert_eq!(doc.keys(true), ["section"]);
    }
}
