//! Schema repository: resource type to behavior flags and metadata.
//!
//! Registration happens once, before any scan. After [`SchemaRepository::seal`]
//! the repository only serves reads and can be shared across diff workers
//! without locking.

use crate::errors::{DriftwatchError, Result};
use crate::model::AttrValue;
use std::collections::{BTreeMap, BTreeSet};

use super::flags::{SchemaFlag, SchemaFlags};

static NO_FIELDS: BTreeSet<String> = BTreeSet::new();
static NO_DEFAULTS: BTreeMap<String, AttrValue> = BTreeMap::new();

/// Lifecycle phase of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryPhase {
    /// Accepting registrations
    Registration,
    /// Read-only
    Sealed,
}

/// Metadata registered for one resource type
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    pub flags: SchemaFlags,

    /// Dotted attribute paths populated by the provider after creation
    pub computed_fields: BTreeSet<String>,

    /// Attributes whose values must never reach a changelog
    pub sensitive_fields: BTreeSet<String>,

    /// Provider defaults; an attribute equal to its default is not drift
    pub defaults: BTreeMap<String, AttrValue>,

    /// Natural-key candidates for matching list elements in deep mode
    pub list_keys: Vec<String>,
}

impl ResourceSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, flag: SchemaFlag) -> Self {
        self.flags.insert(flag);
        self
    }

    pub fn computed(mut self, path: impl Into<String>) -> Self {
        self.computed_fields.insert(path.into());
        self
    }

    pub fn sensitive(mut self, field: impl Into<String>) -> Self {
        self.sensitive_fields.insert(field.into());
        self
    }

    pub fn default_value(mut self, field: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    pub fn list_key(mut self, key: impl Into<String>) -> Self {
        self.list_keys.push(key.into());
        self
    }

    /// Whether `path` is a computed field or lies beneath one
    pub fn is_computed(&self, path: &[String]) -> bool {
        (1..=path.len()).any(|n| self.computed_fields.contains(&path[..n].join(".")))
    }
}

/// Process-wide registry of per-type schema metadata
#[derive(Debug, Clone)]
pub struct SchemaRepository {
    schemas: BTreeMap<String, ResourceSchema>,
    phase: RegistryPhase,
}

impl Default for SchemaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRepository {
    pub fn new() -> Self {
        Self {
            schemas: BTreeMap::new(),
            phase: RegistryPhase::Registration,
        }
    }

    /// Register full metadata for a type
    ///
    /// Registering identical metadata twice is a no-op.
    ///
    /// # Errors
    ///
    /// - `RegistrySealed` if the repository has been sealed
    /// - `SchemaConflict` if different metadata is already registered
    pub fn register(&mut self, resource_type: &str, schema: ResourceSchema) -> Result<()> {
        self.ensure_open(resource_type)?;

        match self.schemas.get(resource_type) {
            Some(existing) if *existing == schema => {
                tracing::debug!(resource_type, "schema re-registered with identical metadata");
                Ok(())
            }
            Some(existing) => Err(DriftwatchError::SchemaConflict {
                resource_type: resource_type.to_string(),
                reason: format!(
                    "already registered with flags [{}], refusing [{}]",
                    existing.flags, schema.flags
                ),
            }),
            None => {
                tracing::debug!(resource_type, flags = %schema.flags, "schema registered");
                self.schemas.insert(resource_type.to_string(), schema);
                Ok(())
            }
        }
    }

    /// Register behavior flags for a type
    ///
    /// # Errors
    ///
    /// - `RegistrySealed` if the repository has been sealed
    /// - `SchemaConflict` if the type already carries different flags
    pub fn set_flags(
        &mut self,
        resource_type: &str,
        flags: impl IntoIterator<Item = SchemaFlag>,
    ) -> Result<()> {
        self.ensure_open(resource_type)?;
        let flags: SchemaFlags = flags.into_iter().collect();

        match self.schemas.get(resource_type) {
            Some(existing) if existing.flags == flags => Ok(()),
            Some(existing) => Err(DriftwatchError::SchemaConflict {
                resource_type: resource_type.to_string(),
                reason: format!(
                    "flags [{}] already registered, refusing [{}]",
                    existing.flags, flags
                ),
            }),
            None => {
                tracing::debug!(resource_type, flags = %flags, "schema flags registered");
                self.schemas.insert(
                    resource_type.to_string(),
                    ResourceSchema {
                        flags,
                        ..ResourceSchema::default()
                    },
                );
                Ok(())
            }
        }
    }

    /// Flags for a type; unknown types have none
    pub fn get_flags(&self, resource_type: &str) -> SchemaFlags {
        self.schemas
            .get(resource_type)
            .map(|s| s.flags.clone())
            .unwrap_or_default()
    }

    pub fn has_flag(&self, resource_type: &str, flag: SchemaFlag) -> bool {
        self.schemas
            .get(resource_type)
            .is_some_and(|s| s.flags.contains(flag))
    }

    pub fn get(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.schemas.get(resource_type)
    }

    pub fn is_computed_field(&self, resource_type: &str, path: &[String]) -> bool {
        self.schemas
            .get(resource_type)
            .is_some_and(|s| s.is_computed(path))
    }

    pub fn sensitive_fields(&self, resource_type: &str) -> &BTreeSet<String> {
        self.schemas
            .get(resource_type)
            .map(|s| &s.sensitive_fields)
            .unwrap_or(&NO_FIELDS)
    }

    pub fn defaults(&self, resource_type: &str) -> &BTreeMap<String, AttrValue> {
        self.schemas
            .get(resource_type)
            .map(|s| &s.defaults)
            .unwrap_or(&NO_DEFAULTS)
    }

    pub fn list_keys(&self, resource_type: &str) -> &[String] {
        self.schemas
            .get(resource_type)
            .map(|s| s.list_keys.as_slice())
            .unwrap_or(&[])
    }

    /// Registered types, sorted
    pub fn types(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }

    /// End the registration phase
    pub fn seal(&mut self) {
        if self.phase != RegistryPhase::Sealed {
            tracing::debug!(types = self.schemas.len(), "schema repository sealed");
        }
        self.phase = RegistryPhase::Sealed;
    }

    pub fn is_sealed(&self) -> bool {
        self.phase == RegistryPhase::Sealed
    }

    pub fn phase(&self) -> RegistryPhase {
        self.phase
    }

    fn ensure_open(&self, resource_type: &str) -> Result<()> {
        if self.phase == RegistryPhase::Sealed {
            return Err(DriftwatchError::RegistrySealed {
                registry: "schema".to_string(),
                resource_type: resource_type.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unknown_type_has_no_flags() {
        let repo = SchemaRepository::new();
        assert!(repo.get_flags("aws_nothing").is_empty());
        assert!(repo.sensitive_fields("aws_nothing").is_empty());
        assert!(repo.list_keys("aws_nothing").is_empty());
    }

    #[test]
    fn test_computed_covers_descendants() {
        let schema = ResourceSchema::new().computed("network_interface");
        assert!(schema.is_computed(&path(&["network_interface"])));
        assert!(schema.is_computed(&path(&["network_interface", "0", "id"])));
        assert!(!schema.is_computed(&path(&["network"])));
    }

    #[test]
    fn test_nested_computed_path() {
        let schema = ResourceSchema::new().computed("root_block_device.volume_id");
        assert!(schema.is_computed(&path(&["root_block_device", "volume_id"])));
        assert!(!schema.is_computed(&path(&["root_block_device"])));
    }

    #[test]
    fn test_phase_transitions() {
        let mut repo = SchemaRepository::new();
        assert_eq!(repo.phase(), RegistryPhase::Registration);
        repo.seal();
        repo.seal();
        assert_eq!(repo.phase(), RegistryPhase::Sealed);
    }
}
