use crate::errors::{DriftwatchError, Result};
use crate::model::value::AttrValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute bag of a resource, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build attributes from a JSON object
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `value` is not a JSON object (`null` is
    /// accepted as an empty bag).
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        match AttrValue::from_json(value) {
            AttrValue::Map(map) => Ok(Self(map)),
            AttrValue::Null => Ok(Self::new()),
            other => Err(DriftwatchError::InvalidInput {
                reason: format!("attributes must be an object, got {}", other.kind_name()),
            }),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AttrValue> {
        self.0.get_mut(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(AttrValue::as_str)
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Insert only when the key is absent or null. Returns whether it inserted.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: AttrValue) -> bool {
        let key = key.into();
        match self.0.get(&key) {
            Some(existing) if !existing.is_null() => false,
            _ => {
                self.0.insert(key, value);
                true
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttrValue)> {
        self.0.iter()
    }

    /// Keep only the entries for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &AttrValue) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, AttrValue> {
        &self.0
    }

    pub fn into_map(self) -> BTreeMap<String, AttrValue> {
        self.0
    }
}

impl From<BTreeMap<String, AttrValue>> for Attributes {
    fn from(map: BTreeMap<String, AttrValue>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, AttrValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a AttrValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_requires_object() {
        assert!(Attributes::from_json(json!({"a": 1})).is_ok());
        assert!(Attributes::from_json(json!(null)).unwrap().is_empty());

        let err = Attributes::from_json(json!([1, 2])).unwrap_err();
        assert!(matches!(err, DriftwatchError::InvalidInput { .. }));
    }

    #[test]
    fn test_insert_if_absent_never_overwrites() {
        let mut attrs = Attributes::from_json(json!({"size": 8, "iops": null})).unwrap();

        assert!(!attrs.insert_if_absent("size", AttrValue::Int(23)));
        assert!(attrs.insert_if_absent("iops", AttrValue::Int(1234)));
        assert!(attrs.insert_if_absent("kms_key_id", AttrValue::from("kms")));

        assert_eq!(attrs.get("size"), Some(&AttrValue::Int(8)));
        assert_eq!(attrs.get("iops"), Some(&AttrValue::Int(1234)));
        assert_eq!(attrs.get_str("kms_key_id"), Some("kms"));
    }

    #[test]
    fn test_keys_iterate_lexicographically() {
        let attrs = Attributes::from_json(json!({"zone": 1, "arn": 2, "id": 3})).unwrap();
        let keys: Vec<&String> = attrs.keys().collect();
        assert_eq!(keys, vec!["arn", "id", "zone"]);
    }
}
