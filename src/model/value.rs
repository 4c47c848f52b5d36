use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

use super::path::Segment;

/// Key-ordered mapping used for JSON objects
pub type JsonMap = IndexMap<String, JsonValue>;

/// A JSON document node.
///
/// Containers are reference-counted so that a copy-on-write update only
/// allocates along the edited path; every untouched subtree keeps its
/// storage (see [`JsonValue::shares_storage`]). Equality is structural.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JsonValue {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Arc<Vec<JsonValue>>),
    Object(Arc<JsonMap>),
}

impl JsonValue {
    pub fn empty_object() -> Self {
        JsonValue::Object(Arc::new(JsonMap::new()))
    }

    pub fn empty_array() -> Self {
        JsonValue::Array(Arc::new(Vec::new()))
    }

    pub fn array<I: IntoIterator<Item = JsonValue>>(items: I) -> Self {
        JsonValue::Array(Arc::new(items.into_iter().collect()))
    }

    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, JsonValue)>,
    {
        JsonValue::Object(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Null, booleans, numbers and strings are scalars; arrays and objects are not.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, JsonValue::Array(_) | JsonValue::Object(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&JsonMap> {
        match self {
            JsonValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the runtime type, as shown to users
    pub fn type_name(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Array(_) => "array",
            JsonValue::Object(_) => "object",
        }
    }

    /// Look up a single path segment. A key only resolves on an object and an
    /// index only resolves on an array (within bounds).
    pub fn child(&self, segment: &Segment) -> Option<&JsonValue> {
        match (self, segment) {
            (JsonValue::Object(map), Segment::Key(key)) => map.get(key),
            (JsonValue::Array(items), Segment::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    pub fn get_key(&self, key: &str) -> Option<&JsonValue> {
        self.as_object()?.get(key)
    }

    pub fn get_index(&self, index: usize) -> Option<&JsonValue> {
        self.as_array()?.get(index)
    }

    /// True when both values are containers backed by the same allocation.
    /// Scalars never share storage.
    pub fn shares_storage(&self, other: &JsonValue) -> bool {
        match (self, other) {
            (JsonValue::Array(a), JsonValue::Array(b)) => Arc::ptr_eq(a, b),
            (JsonValue::Object(a), JsonValue::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Pretty-printed JSON text (two-space indent)
    pub fn to_pretty_string(&self) -> String {
        // Serializing an in-memory tree with string keys cannot fail
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => JsonValue::Null,
            serde_json::Value::Bool(b) => JsonValue::Bool(b),
            serde_json::Value::Number(n) => JsonValue::Number(n),
            serde_json::Value::String(s) => JsonValue::String(s),
            serde_json::Value::Array(items) => {
                JsonValue::array(items.into_iter().map(JsonValue::from))
            }
            serde_json::Value::Object(map) => {
                JsonValue::object(map.into_iter().map(|(k, v)| (k, JsonValue::from(v))))
            }
        }
    }
}

impl From<&JsonValue> for serde_json::Value {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => serde_json::Value::Null,
            JsonValue::Bool(b) => serde_json::Value::Bool(*b),
            JsonValue::Number(n) => serde_json::Value::Number(n.clone()),
            JsonValue::String(s) => serde_json::Value::String(s.clone()),
            JsonValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            JsonValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for JsonValue {
    fn from(b: bool) -> Self {
        JsonValue::Bool(b)
    }
}

impl From<i64> for JsonValue {
    fn from(n: i64) -> Self {
        JsonValue::Number(n.into())
    }
}

impl From<u64> for JsonValue {
    fn from(n: u64) -> Self {
        JsonValue::Number(n.into())
    }
}

/// Non-finite floats have no JSON representation and become null.
impl From<f64> for JsonValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(JsonValue::Null, JsonValue::Number)
    }
}

impl From<Number> for JsonValue {
    fn from(n: Number) -> Self {
        JsonValue::Number(n)
    }
}

impl From<&str> for JsonValue {
    fn from(s: &str) -> Self {
        JsonValue::String(s.to_string())
    }
}

impl From<String> for JsonValue {
    fn from(s: String) -> Self {
        JsonValue::String(s)
    }
}

impl Serialize for JsonValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            JsonValue::Null => serializer.serialize_unit(),
            JsonValue::Bool(b) => serializer.serialize_bool(*b),
            JsonValue::Number(n) => n.serialize(serializer),
            JsonValue::String(s) => serializer.serialize_str(s),
            JsonValue::Array(items) => serializer.collect_seq(items.iter()),
            JsonValue::Object(map) => serializer.collect_map(map.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for JsonValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(JsonValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_from_serde_value_preserving_key_order() {
        let v = JsonValue::from(json!({"zeta": 1, "alpha": [true, null], "mid": "x"}));
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(v.get_key("alpha").unwrap().get_index(0), Some(&JsonValue::Bool(true)));
        assert!(v.get_key("alpha").unwrap().get_index(1).unwrap().is_null());
    }

    #[test]
    fn serde_round_trip_through_text() {
        let text = r#"{"b":{"c":[1,2.5,"s"]},"a":false}"#;
        let v: JsonValue = serde_json::from_str(text).unwrap();
        assert_eq!(v.to_string(), text);
    }

    #[test]
    fn equality_ignores_storage_identity() {
        let a = JsonValue::from(json!({"x": [1, 2]}));
        let b = JsonValue::from(json!({"x": [1, 2]}));
        assert_eq!(a, b);
        assert!(!a.shares_storage(&b));
        let c = a.clone();
        assert!(a.shares_storage(&c));
    }

    #[test]
    fn child_respects_container_kind() {
        let v = JsonValue::from(json!({"0": "key", "list": ["idx"]}));
        assert_eq!(v.child(&Segment::Key("0".into())), Some(&JsonValue::from("key")));
        assert_eq!(v.child(&Segment::Index(0)), None);
        let list = v.get_key("list").unwrap();
        assert_eq!(list.child(&Segment::Index(0)), Some(&JsonValue::from("idx")));
        assert_eq!(list.child(&Segment::Key("0".into())), None);
        assert_eq!(list.child(&Segment::Index(1)), None);
    }

    #[test]
    fn scalars_and_type_names() {
        assert!(JsonValue::Null.is_scalar());
        assert!(JsonValue::from(1i64).is_scalar());
        assert!(!JsonValue::empty_array().is_scalar());
        assert!(!JsonValue::empty_object().is_scalar());
        assert_eq!(JsonValue::from("s").type_name(), "string");
        assert_eq!(JsonValue::from(f64::NAN), JsonValue::Null);
    }
}
