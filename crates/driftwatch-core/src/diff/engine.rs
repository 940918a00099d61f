//! Changelog computation.
//!
//! The entry points are [`compute_changelog`] (all types) and
//! [`compute_changelog_for_type`] (one diff unit). Concatenating the
//! per-type results in type order yields exactly what `compute_changelog`
//! returns, which is what lets callers spread the units over threads.

use crate::diff::model::{Change, ChangeKind, Changelog};
use crate::errors::{DwError, DwErrorKind};
use crate::filter::Filter;
use crate::model::{AttrValue, Resource, ResourceKey, ResourceSet};
use crate::schema::{ResourceSchema, SchemaFlag, SchemaRepository};
use std::collections::{BTreeMap, BTreeSet};

/// Natural-key candidates tried after the schema's own `list_keys`
pub const DEFAULT_LIST_KEYS: &[&str] = &["id", "name", "key"];

/// Compare two resource sets
///
/// # Errors
///
/// Returns `InternalInconsistency` if a resource's own `(type, id)`
/// disagrees with the key it is stored under.
pub fn compute_changelog(
    before: &ResourceSet,
    after: &ResourceSet,
    schema: &SchemaRepository,
    filter: &dyn Filter,
) -> Result<Changelog, DwError> {
    let mut changes = Vec::new();
    for resource_type in diff_units(before, after) {
        changes.extend(compute_changelog_for_type(
            before,
            after,
            &resource_type,
            schema,
            filter,
        )?);
    }
    Ok(Changelog::from_changes(changes))
}

/// Resource types present on either side, sorted
pub fn diff_units(before: &ResourceSet, after: &ResourceSet) -> Vec<String> {
    let types: BTreeSet<&str> = before.types().into_iter().chain(after.types()).collect();
    types.into_iter().map(str::to_string).collect()
}

/// Compare the resources of one type
///
/// # Errors
///
/// Same as [`compute_changelog`].
pub fn compute_changelog_for_type(
    before: &ResourceSet,
    after: &ResourceSet,
    resource_type: &str,
    schema: &SchemaRepository,
    filter: &dyn Filter,
) -> Result<Vec<Change>, DwError> {
    if filter.is_type_ignored(resource_type)
        || schema.has_flag(resource_type, SchemaFlag::IgnoredByDefault)
    {
        tracing::debug!(resource_type, "type ignored, skipping diff unit");
        return Ok(Vec::new());
    }

    let computed_only = schema.has_flag(resource_type, SchemaFlag::ComputedOnly);
    let keys: BTreeSet<ResourceKey> = before
        .keys_of_type(resource_type)
        .into_iter()
        .chain(after.keys_of_type(resource_type))
        .collect();

    let mut changes = Vec::new();
    for key in &keys {
        match (before.get(key), after.get(key)) {
            (None, Some(added)) => {
                ensure_identity(key, added)?;
                if computed_only || filter.is_resource_ignored(added) {
                    continue;
                }
                changes.push(resource_change(key, ChangeKind::Created, None, Some(added)));
            }
            (Some(removed), None) => {
                ensure_identity(key, removed)?;
                if filter.is_resource_ignored(removed) {
                    continue;
                }
                changes.push(resource_change(key, ChangeKind::Deleted, Some(removed), None));
            }
            (Some(b), Some(a)) => {
                ensure_identity(key, b)?;
                ensure_identity(key, a)?;
                if filter.is_resource_ignored(b) || filter.is_resource_ignored(a) {
                    continue;
                }
                let mut walker = FieldWalker {
                    key,
                    resource: b,
                    schema: schema.get(resource_type),
                    filter,
                    deep: schema.has_flag(resource_type, SchemaFlag::DeepMode),
                    changes: &mut changes,
                };
                let mut path = Vec::new();
                walker.compare_maps(b.attributes.as_map(), a.attributes.as_map(), &mut path);
            }
            (None, None) => {
                return Err(DwError::new(DwErrorKind::InternalInconsistency)
                    .with_op("compute_changelog_for_type")
                    .with_resource_type(key.resource_type.clone())
                    .with_resource_id(key.id.clone())
                    .with_message("key indexed but present on neither side"));
            }
        }
    }

    tracing::debug!(
        resource_type,
        resources = keys.len(),
        changes = changes.len(),
        "diff unit computed"
    );
    Ok(changes)
}

fn ensure_identity(key: &ResourceKey, resource: &Resource) -> Result<(), DwError> {
    if resource.has_key(key) {
        return Ok(());
    }
    Err(DwError::new(DwErrorKind::InternalInconsistency)
        .with_op("compute_changelog")
        .with_resource_type(key.resource_type.clone())
        .with_resource_id(key.id.clone())
        .with_message(format!(
            "resource stored under {} identifies itself as {}",
            key,
            resource.key()
        )))
}

fn resource_change(
    key: &ResourceKey,
    kind: ChangeKind,
    before: Option<&Resource>,
    after: Option<&Resource>,
) -> Change {
    let tree = |r: &Resource| AttrValue::Map(r.attributes.as_map().clone());
    Change {
        resource_type: key.resource_type.clone(),
        resource_id: key.id.clone(),
        kind,
        path: Vec::new(),
        from: before.map(tree),
        to: after.map(tree),
    }
}

/// Recursive attribute comparison for one resource pair
struct FieldWalker<'a> {
    key: &'a ResourceKey,
    resource: &'a Resource,
    schema: Option<&'a ResourceSchema>,
    filter: &'a dyn Filter,
    deep: bool,
    changes: &'a mut Vec<Change>,
}

/// `null` and absent are the same thing inside an attribute tree
fn present(value: Option<&AttrValue>) -> Option<&AttrValue> {
    value.filter(|v| !v.is_null())
}

impl<'a> FieldWalker<'a> {
    fn compare_maps(
        &mut self,
        before: &BTreeMap<String, AttrValue>,
        after: &BTreeMap<String, AttrValue>,
        path: &mut Vec<String>,
    ) {
        let fields: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
        for field in fields {
            path.push(field.clone());
            self.compare_node(present(before.get(field)), present(after.get(field)), path);
            path.pop();
        }
    }

    fn compare_lists(&mut self, before: &[AttrValue], after: &[AttrValue], path: &mut Vec<String>) {
        if let Some(key_field) = self.natural_key(before, after) {
            let before_by_key = index_by_key(before, key_field);
            let after_by_key = index_by_key(after, key_field);
            let keys: BTreeSet<&String> = before_by_key.keys().chain(after_by_key.keys()).collect();
            for key in keys {
                path.push(key.clone());
                self.compare_node(
                    before_by_key.get(key).copied(),
                    after_by_key.get(key).copied(),
                    path,
                );
                path.pop();
            }
            return;
        }

        for index in 0..before.len().max(after.len()) {
            path.push(index.to_string());
            self.compare_node(present(before.get(index)), present(after.get(index)), path);
            path.pop();
        }
    }

    fn compare_node(
        &mut self,
        before: Option<&AttrValue>,
        after: Option<&AttrValue>,
        path: &mut Vec<String>,
    ) {
        if self.filter.is_field_ignored(self.resource, path) {
            return;
        }

        match (before, after) {
            (None, None) => {}
            (Some(b), None) => self.emit(ChangeKind::Deleted, path, Some(b), None),
            (None, Some(a)) => {
                if self.schema.is_some_and(|s| s.is_computed(path)) {
                    return;
                }
                self.emit(ChangeKind::Created, path, None, Some(a));
            }
            (Some(b), Some(a)) => {
                if b == a {
                    return;
                }
                if self.deep {
                    match (b, a) {
                        (AttrValue::Map(bm), AttrValue::Map(am)) => {
                            return self.compare_maps(bm, am, path);
                        }
                        (AttrValue::List(bl), AttrValue::List(al)) => {
                            return self.compare_lists(bl, al, path);
                        }
                        _ => {}
                    }
                }
                self.emit(ChangeKind::Updated, path, Some(b), Some(a));
            }
        }
    }

    /// First candidate key that identifies every element on both sides
    fn natural_key(&self, before: &[AttrValue], after: &[AttrValue]) -> Option<&'a str> {
        let schema_keys = self
            .schema
            .map(|s| s.list_keys.as_slice())
            .unwrap_or(&[]);
        schema_keys
            .iter()
            .map(String::as_str)
            .chain(DEFAULT_LIST_KEYS.iter().copied())
            .find(|candidate| keyable(before, candidate) && keyable(after, candidate))
    }

    fn emit(
        &mut self,
        kind: ChangeKind,
        path: &[String],
        from: Option<&AttrValue>,
        to: Option<&AttrValue>,
    ) {
        self.changes.push(Change {
            resource_type: self.key.resource_type.clone(),
            resource_id: self.key.id.clone(),
            kind,
            path: path.to_vec(),
            from: from.cloned(),
            to: to.cloned(),
        });
    }
}

/// Every element is a map with a distinct scalar value under `field`
fn keyable(items: &[AttrValue], field: &str) -> bool {
    let mut seen = BTreeSet::new();
    items.iter().all(|item| {
        item.as_map()
            .and_then(|m| m.get(field))
            .and_then(AttrValue::scalar_key)
            .is_some_and(|k| seen.insert(k))
    })
}

fn index_by_key<'v>(items: &'v [AttrValue], field: &str) -> BTreeMap<String, &'v AttrValue> {
    items
        .iter()
        .filter_map(|item| {
            let key = item.as_map()?.get(field)?.scalar_key()?;
            Some((key, item))
        })
        .collect()
}
