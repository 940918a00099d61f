//! Changelog output types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! Entry order is deterministic: resource type, then id, then attribute
//! traversal order.

use crate::errors::DwError;
use crate::model::{AttrValue, ResourceKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What happened at a path
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present only in `after`
    Created,
    /// Present only in `before`
    Deleted,
    /// Present on both sides with different values
    Updated,
}

impl ChangeKind {
    /// The kind seen when `before` and `after` are swapped
    pub fn inverse(self) -> Self {
        match self {
            ChangeKind::Created => ChangeKind::Deleted,
            ChangeKind::Deleted => ChangeKind::Created,
            ChangeKind::Updated => ChangeKind::Updated,
        }
    }
}

/// One changelog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Change {
    /// Type of the resource the entry belongs to
    pub resource_type: String,
    /// Id of the resource the entry belongs to
    pub resource_id: String,
    pub kind: ChangeKind,
    /// Segments from the resource root to the differing node; empty for a
    /// whole-resource entry. List elements are addressed by natural key
    /// value or by index.
    pub path: Vec<String>,
    /// Value in `before`, absent for `Created`
    pub from: Option<AttrValue>,
    /// Value in `after`, absent for `Deleted`
    pub to: Option<AttrValue>,
}

impl Change {
    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type.clone(), self.resource_id.clone())
    }

    /// Whole resource added or removed
    pub fn is_resource_level(&self) -> bool {
        self.path.is_empty()
    }

    /// Path joined with `.`
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }
}

/// Counts over a changelog
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSummary {
    /// Resources only in `after`
    pub resources_created: usize,
    /// Resources only in `before`
    pub resources_deleted: usize,
    /// Resources on both sides with at least one field entry
    pub resources_updated: usize,
    /// Field-level entries of any kind
    pub field_changes: usize,
}

/// Ordered list of changes produced by one comparison
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Changelog {
    pub changes: Vec<Change>,
}

impl Changelog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_changes(changes: Vec<Change>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter()
    }

    /// Entries for one resource, in changelog order
    pub fn for_resource<'a>(&'a self, key: &'a ResourceKey) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes
            .iter()
            .filter(move |c| c.resource_type == key.resource_type && c.resource_id == key.id)
    }

    /// Entries grouped by resource
    pub fn by_resource(&self) -> BTreeMap<ResourceKey, Vec<&Change>> {
        let mut grouped: BTreeMap<ResourceKey, Vec<&Change>> = BTreeMap::new();
        for change in &self.changes {
            grouped.entry(change.key()).or_default().push(change);
        }
        grouped
    }

    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        let mut updated = std::collections::BTreeSet::new();
        for change in &self.changes {
            match (change.is_resource_level(), change.kind) {
                (true, ChangeKind::Created) => summary.resources_created += 1,
                (true, ChangeKind::Deleted) => summary.resources_deleted += 1,
                _ => {
                    summary.field_changes += 1;
                    updated.insert((&change.resource_type, &change.resource_id));
                }
            }
        }
        summary.resources_updated = updated.len();
        summary
    }

    /// Pretty JSON for the reporting collaborator
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if encoding fails.
    pub fn to_json_string(&self) -> Result<String, DwError> {
        serde_json::to_string_pretty(self).map_err(DwError::from)
    }
}

impl IntoIterator for Changelog {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(id: &str, kind: ChangeKind, path: &[&str]) -> Change {
        Change {
            resource_type: "aws_instance".to_string(),
            resource_id: id.to_string(),
            kind,
            path: path.iter().map(|s| s.to_string()).collect(),
            from: None,
            to: None,
        }
    }

    #[test]
    fn test_summary_counts_distinct_updated_resources() {
        let log = Changelog::from_changes(vec![
            change("i-1", ChangeKind::Created, &[]),
            change("i-2", ChangeKind::Updated, &["availability_zone"]),
            change("i-2", ChangeKind::Created, &["tags", "Env"]),
            change("i-3", ChangeKind::Deleted, &[]),
        ]);

        assert_eq!(
            log.summary(),
            DiffSummary {
                resources_created: 1,
                resources_deleted: 1,
                resources_updated: 1,
                field_changes: 2,
            }
        );
        assert_eq!(log.by_resource().len(), 3);
    }

    #[test]
    fn test_kind_inverse() {
        assert_eq!(ChangeKind::Created.inverse(), ChangeKind::Deleted);
        assert_eq!(ChangeKind::Updated.inverse(), ChangeKind::Updated);
    }

    #[test]
    fn test_serialized_kind_is_snake_case() {
        let json = serde_json::to_value(change("i-1", ChangeKind::Updated, &["a"])).unwrap();
        assert_eq!(json["kind"], "updated");
        assert_eq!(json["path"], serde_json::json!(["a"]));
    }
}
