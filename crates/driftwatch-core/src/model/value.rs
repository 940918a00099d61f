use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A node in a resource attribute tree
///
/// Closed set of shapes an attribute can take. Mappings are ordered by key
/// so every traversal is lexicographic.
///
/// Numbers compare by value: `Int(8) == Float(8.0)`. Providers are not
/// consistent about reporting sizes as integers or floats, and neither
/// representation is drift. A null mapping entry equals an absent one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

impl AttrValue {
    /// Convert a JSON value into an attribute tree
    ///
    /// Unsigned integers beyond `i64::MAX` become floats.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttrValue::Null,
            serde_json::Value::Bool(b) => AttrValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => AttrValue::Int(i),
                None => AttrValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => AttrValue::String(s),
            serde_json::Value::Array(items) => {
                AttrValue::List(items.into_iter().map(AttrValue::from_json).collect())
            }
            serde_json::Value::Object(map) => AttrValue::Map(
                map.into_iter()
                    .map(|(k, v)| (k, AttrValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back into JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AttrValue::Null => serde_json::Value::Null,
            AttrValue::Bool(b) => serde_json::Value::Bool(*b),
            AttrValue::Int(i) => serde_json::Value::from(*i),
            AttrValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            AttrValue::String(s) => serde_json::Value::String(s.clone()),
            AttrValue::List(items) => {
                serde_json::Value::Array(items.iter().map(AttrValue::to_json).collect())
            }
            AttrValue::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Compact JSON with sorted keys; stable across runs
    pub fn canonical_json(&self) -> String {
        self.to_json().to_string()
    }

    /// Short name of the variant, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            AttrValue::Null => "null",
            AttrValue::Bool(_) => "bool",
            AttrValue::Int(_) | AttrValue::Float(_) => "number",
            AttrValue::String(_) => "string",
            AttrValue::List(_) => "list",
            AttrValue::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    /// True for lists and maps; these compare element-wise in deep mode
    pub fn is_collection(&self) -> bool {
        matches!(self, AttrValue::List(_) | AttrValue::Map(_))
    }

    /// True for an empty list or an empty map
    pub fn is_empty_collection(&self) -> bool {
        match self {
            AttrValue::List(items) => items.is_empty(),
            AttrValue::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            AttrValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(i) => Some(*i as f64),
            AttrValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut BTreeMap<String, AttrValue>> {
        match self {
            AttrValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Render a scalar as a path segment / natural-key value
    ///
    /// Returns `None` for null, floats and collections, which cannot
    /// identify a list element.
    pub fn scalar_key(&self) -> Option<String> {
        match self {
            AttrValue::String(s) => Some(s.clone()),
            AttrValue::Int(i) => Some(i.to_string()),
            AttrValue::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Null, AttrValue::Null) => true,
            (AttrValue::Bool(a), AttrValue::Bool(b)) => a == b,
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Int(i), AttrValue::Float(f)) | (AttrValue::Float(f), AttrValue::Int(i)) => {
                (*i as f64) == *f
            }
            (AttrValue::String(a), AttrValue::String(b)) => a == b,
            (AttrValue::List(a), AttrValue::List(b)) => a == b,
            (AttrValue::Map(a), AttrValue::Map(b)) => present_entries(a).eq(present_entries(b)),
            _ => false,
        }
    }
}

fn present_entries(
    map: &BTreeMap<String, AttrValue>,
) -> impl Iterator<Item = (&String, &AttrValue)> + '_ {
    map.iter().filter(|(_, value)| !value.is_null())
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_json())
    }
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        AttrValue::from_json(value)
    }
}

impl From<&AttrValue> for serde_json::Value {
    fn from(value: &AttrValue) -> Self {
        value.to_json()
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<i32> for AttrValue {
    fn from(i: i32) -> Self {
        AttrValue::Int(i64::from(i))
    }
}

impl From<u32> for AttrValue {
    fn from(i: u32) -> Self {
        AttrValue::Int(i64::from(i))
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<Vec<AttrValue>> for AttrValue {
    fn from(items: Vec<AttrValue>) -> Self {
        AttrValue::List(items)
    }
}

impl From<BTreeMap<String, AttrValue>> for AttrValue {
    fn from(map: BTreeMap<String, AttrValue>) -> Self {
        AttrValue::Map(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(AttrValue::Int(8), AttrValue::Float(8.0));
        assert_eq!(AttrValue::Float(8.0), AttrValue::Int(8));
        assert_ne!(AttrValue::Int(8), AttrValue::Float(8.5));
        assert_ne!(AttrValue::Int(1), AttrValue::Bool(true));
    }

    #[test]
    fn test_null_map_entries_equal_absent() {
        let with_null = AttrValue::from_json(json!({"spec": {"a": 1, "b": null}}));
        let without = AttrValue::from_json(json!({"spec": {"a": 1}}));

        assert_eq!(with_null, without);
        assert_eq!(without, with_null);
        assert_ne!(with_null, AttrValue::from_json(json!({"spec": {"a": 1, "b": 2}})));
    }

    #[test]
    fn test_from_json_preserves_shape() {
        let value = AttrValue::from_json(json!({
            "size": 8,
            "ratio": 0.5,
            "tags": {"Name": "web"},
            "ids": ["a", "b"],
            "gone": null
        }));

        let map = value.as_map().unwrap();
        assert_eq!(map["size"], AttrValue::Int(8));
        assert_eq!(map["ratio"], AttrValue::Float(0.5));
        assert_eq!(map["tags"].kind_name(), "map");
        assert_eq!(map["ids"].as_list().map(<[AttrValue]>::len), Some(2));
        assert!(map["gone"].is_null());
    }

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = AttrValue::from_json(json!({"b": 1, "a": [true, null]}));
        assert_eq!(value.canonical_json(), r#"{"a":[true,null],"b":1}"#);
    }

    #[test]
    fn test_serde_untagged_round_trip() {
        let value = AttrValue::from_json(json!({"n": 3, "f": 1.5, "s": "x", "z": null}));
        let text = serde_json::to_string(&value).unwrap();
        let back: AttrValue = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
        assert!(matches!(back.as_map().unwrap()["n"], AttrValue::Int(3)));
    }

    #[test]
    fn test_scalar_key_rejects_collections() {
        assert_eq!(AttrValue::from("/dev/sda1").scalar_key().as_deref(), Some("/dev/sda1"));
        assert_eq!(AttrValue::Int(0).scalar_key().as_deref(), Some("0"));
        assert_eq!(AttrValue::List(vec![]).scalar_key(), None);
        assert_eq!(AttrValue::Null.scalar_key(), None);
    }

    #[test]
    fn test_as_i64_accepts_integral_floats() {
        assert_eq!(AttrValue::Float(23.0).as_i64(), Some(23));
        assert_eq!(AttrValue::Float(23.5).as_i64(), None);
    }

    #[test]
    fn test_non_finite_float_serializes_as_null() {
        assert_eq!(AttrValue::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
