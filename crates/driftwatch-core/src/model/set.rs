use crate::errors::{DriftwatchError, Result};
use std::collections::{BTreeMap, BTreeSet};

use super::resource::{Resource, ResourceKey};

/// Keyed collection of canonical resources
///
/// At most one resource per `(type, id)`. Iteration is in key order, which
/// makes every consumer (middleware, diff) deterministic regardless of the
/// order resources were enumerated in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSet {
    resources: BTreeMap<ResourceKey, Resource>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set, failing on the first duplicate key
    ///
    /// # Errors
    ///
    /// Returns `DuplicateResource` if two resources share a `(type, id)`.
    pub fn from_resources(resources: impl IntoIterator<Item = Resource>) -> Result<Self> {
        let mut set = Self::new();
        for resource in resources {
            set.insert(resource)?;
        }
        Ok(set)
    }

    /// Build a set keeping the first occurrence of each key
    ///
    /// Every dropped duplicate is reported as a `DuplicateResource` error.
    pub fn from_resources_lenient(
        resources: impl IntoIterator<Item = Resource>,
    ) -> (Self, Vec<DriftwatchError>) {
        let mut set = Self::new();
        let mut errors = Vec::new();
        for resource in resources {
            if let Err(e) = set.insert(resource) {
                errors.push(e);
            }
        }
        (set, errors)
    }

    /// Insert a new resource
    ///
    /// # Errors
    ///
    /// Returns `DuplicateResource` if the key is already present; the set is
    /// left unchanged.
    pub fn insert(&mut self, resource: Resource) -> Result<()> {
        let key = resource.key();
        if self.resources.contains_key(&key) {
            return Err(DriftwatchError::DuplicateResource {
                resource_type: key.resource_type,
                resource_id: key.id,
            });
        }
        self.resources.insert(key, resource);
        Ok(())
    }

    /// Insert or replace, returning the previous resource with that key
    pub fn upsert(&mut self, resource: Resource) -> Option<Resource> {
        self.resources.insert(resource.key(), resource)
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Resource> {
        self.resources.get(key)
    }

    pub fn get_mut(&mut self, key: &ResourceKey) -> Option<&mut Resource> {
        self.resources.get_mut(key)
    }

    /// Look up by type and id without building a key at the call site
    pub fn find(&self, resource_type: &str, id: &str) -> Option<&Resource> {
        self.resources.get(&ResourceKey::new(resource_type, id))
    }

    pub fn find_mut(&mut self, resource_type: &str, id: &str) -> Option<&mut Resource> {
        self.resources.get_mut(&ResourceKey::new(resource_type, id))
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.resources.contains_key(key)
    }

    pub fn remove(&mut self, key: &ResourceKey) -> Option<Resource> {
        self.resources.remove(key)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in `(type, id)` order
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Resource> {
        self.resources.values_mut()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ResourceKey> {
        self.resources.keys()
    }

    /// Resources of one type, in id order
    pub fn of_type<'a>(&'a self, resource_type: &'a str) -> impl Iterator<Item = &'a Resource> + 'a {
        self.resources
            .values()
            .filter(move |r| r.resource_type == resource_type)
    }

    /// Keys of one type, collected so the caller may mutate the set while
    /// walking them
    pub fn keys_of_type(&self, resource_type: &str) -> Vec<ResourceKey> {
        self.of_type(resource_type).map(Resource::key).collect()
    }

    /// Distinct resource types present, sorted
    pub fn types(&self) -> BTreeSet<&str> {
        self.resources
            .keys()
            .map(|k| k.resource_type.as_str())
            .collect()
    }

    pub fn into_resources(self) -> Vec<Resource> {
        self.resources.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a ResourceSet {
    type Item = &'a Resource;
    type IntoIter = std::collections::btree_map::Values<'a, ResourceKey, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.resources.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attributes;

    fn res(ty: &str, id: &str) -> Resource {
        Resource::new(ty, id, Attributes::new())
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut set = ResourceSet::new();
        set.insert(res("aws_instance", "i-1")).unwrap();

        let err = set.insert(res("aws_instance", "i-1")).unwrap_err();
        assert_eq!(
            err,
            DriftwatchError::DuplicateResource {
                resource_type: "aws_instance".to_string(),
                resource_id: "i-1".to_string(),
            }
        );
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_same_id_different_type_is_distinct() {
        let set = ResourceSet::from_resources(vec![
            res("aws_instance", "x"),
            res("aws_ebs_volume", "x"),
        ])
        .unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_lenient_keeps_first_and_reports_rest() {
        let mut first = res("aws_ebs_volume", "v1");
        first.attributes.insert("size", 8);
        let mut second = res("aws_ebs_volume", "v1");
        second.attributes.insert("size", 23);

        let (set, errors) = ResourceSet::from_resources_lenient(vec![first, second]);

        assert_eq!(errors.len(), 1);
        let kept = set.find("aws_ebs_volume", "v1").unwrap();
        assert_eq!(kept.attributes.get("size").and_then(|v| v.as_i64()), Some(8));
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let set = ResourceSet::from_resources(vec![
            res("aws_instance", "i-2"),
            res("aws_ebs_volume", "v1"),
            res("aws_instance", "i-1"),
        ])
        .unwrap();

        let ids: Vec<&str> = set.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "i-1", "i-2"]);
        assert_eq!(set.keys_of_type("aws_instance").len(), 2);
        assert_eq!(
            set.types().into_iter().collect::<Vec<_>>(),
            vec!["aws_ebs_volume", "aws_instance"]
        );
    }
}
