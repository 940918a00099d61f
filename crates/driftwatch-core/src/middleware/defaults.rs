//! Provider default suppression.
//!
//! A declaration that omits an attribute and a live resource reporting the
//! provider default for it describe the same thing. The stage looks at each
//! `(type, id)` pair across both sets: a defaulted attribute is removed only
//! when neither side holds a different value for it. A real move away from
//! the default stays on both sides and diffs as an update.

use crate::errors::DwError;
use crate::model::{AttrValue, ResourceKey, ResourceSet};
use crate::registry::TypeRegistry;
use crate::schema::SchemaRepository;
use std::collections::BTreeSet;

use super::Middleware;

pub const STAGE_NAME: &str = "default_value_suppressor";

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueSuppressor;

fn field_value<'s>(set: &'s ResourceSet, key: &ResourceKey, field: &str) -> Option<&'s AttrValue> {
    set.get(key).and_then(|r| r.attributes.get(field))
}

fn remove_field(set: &mut ResourceSet, key: &ResourceKey, field: &str) -> usize {
    set.get_mut(key)
        .and_then(|r| r.attributes.remove(field))
        .map_or(0, |_| 1)
}

fn suppress(schema: &SchemaRepository, declared: &mut ResourceSet, live: &mut ResourceSet) -> usize {
    let keys: BTreeSet<ResourceKey> = declared.keys().chain(live.keys()).cloned().collect();
    let mut removed = 0;

    for key in &keys {
        for (field, default) in schema.defaults(&key.resource_type) {
            // Absent, null and the default all mean "provider default"
            let settled =
                |value: Option<&AttrValue>| value.map_or(true, |v| v.is_null() || v == default);
            let declared_settled = settled(field_value(declared, key, field));
            if !(declared_settled && settled(field_value(live, key, field))) {
                continue;
            }
            removed += remove_field(declared, key, field) + remove_field(live, key, field);
        }
    }
    removed
}

impl Middleware for DefaultValueSuppressor {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(
        &self,
        registry: &TypeRegistry,
        declared: &mut ResourceSet,
        live: &mut ResourceSet,
    ) -> Vec<DwError> {
        let removed = suppress(registry.schema(), declared, live);
        tracing::debug!(stage = STAGE_NAME, removed, "default values suppressed");
        Vec::new()
    }
}
