//! Ignore policy applied before and during comparison.
//!
//! The diff engine consults a [`Filter`] at three granularities: whole
//! types, single resources, and attribute paths within a resource. Filters
//! are read-only during a scan and shared between diff workers.

pub mod rules;

use crate::model::Resource;

pub use rules::{IgnoreRule, RuleFilter};

/// Ignore predicates consulted by the diff engine
///
/// Every predicate defaults to "not ignored".
pub trait Filter: Send + Sync {
    fn is_type_ignored(&self, _resource_type: &str) -> bool {
        false
    }

    fn is_resource_ignored(&self, _resource: &Resource) -> bool {
        false
    }

    /// `path` runs from the resource root to the visited node
    fn is_field_ignored(&self, _resource: &Resource, _path: &[String]) -> bool {
        false
    }
}

/// Filter that ignores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFilter;

impl Filter for NoFilter {}
