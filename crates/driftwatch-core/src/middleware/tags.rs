//! Tag normalization.
//!
//! Providers report "no tags" as a missing attribute, `null` or `{}`
//! depending on the API, and add a computed `tags_all` superset that
//! declarations never contain.

use crate::errors::DwError;
use crate::model::{AttrValue, ResourceSet};
use crate::registry::TypeRegistry;

use super::Middleware;

pub const STAGE_NAME: &str = "tags_normalizer";

#[derive(Debug, Clone, Copy, Default)]
pub struct TagsNormalizer;

impl TagsNormalizer {
    fn normalize(set: &mut ResourceSet) -> usize {
        let mut touched = 0;
        for resource in set.iter_mut() {
            let empty_tags = match resource.attributes.get("tags") {
                Some(AttrValue::Null) => true,
                Some(AttrValue::Map(tags)) => tags.is_empty(),
                _ => false,
            };
            if empty_tags {
                resource.attributes.remove("tags");
                touched += 1;
            }
            if resource.attributes.remove("tags_all").is_some() {
                touched += 1;
            }
        }
        touched
    }
}

impl Middleware for TagsNormalizer {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(
        &self,
        _registry: &TypeRegistry,
        declared: &mut ResourceSet,
        live: &mut ResourceSet,
    ) -> Vec<DwError> {
        let touched = Self::normalize(declared) + Self::normalize(live);
        tracing::debug!(stage = STAGE_NAME, touched, "tags normalized");
        Vec::new()
    }
}
