//! Polymorphic resource construction keyed by type tag.

use crate::errors::{DriftwatchError, Result};
use crate::model::{Attributes, Resource};
use std::collections::BTreeMap;
use std::fmt;

use crate::schema::RegistryPhase;

/// Builds a canonical resource of one type from raw attributes
///
/// Implementations are deterministic and side-effect free. A structurally
/// malformed input is an error, never a panic.
///
/// Any `Fn(&str, Attributes) -> Result<Resource>` closure is a factory.
pub trait ResourceFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns `MalformedAttribute` / `MissingAttribute` when `raw` does not
    /// have the shape the type requires.
    fn create(&self, id: &str, raw: Attributes) -> Result<Resource>;
}

impl<F> ResourceFactory for F
where
    F: Fn(&str, Attributes) -> Result<Resource> + Send + Sync,
{
    fn create(&self, id: &str, raw: Attributes) -> Result<Resource> {
        self(id, raw)
    }
}

/// Registry of per-type factories with a verbatim fallback
pub struct FactoryRegistry {
    factories: BTreeMap<String, Box<dyn ResourceFactory>>,
    phase: RegistryPhase,
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("types", &self.factories.keys().collect::<Vec<_>>())
            .field("phase", &self.phase)
            .finish()
    }
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
            phase: RegistryPhase::Registration,
        }
    }

    /// Register the factory for a type
    ///
    /// # Errors
    ///
    /// - `RegistrySealed` after [`FactoryRegistry::seal`]
    /// - `FactoryConflict` if the type already has a factory
    pub fn register(
        &mut self,
        resource_type: &str,
        factory: impl ResourceFactory + 'static,
    ) -> Result<()> {
        self.register_boxed(resource_type, Box::new(factory))
    }

    /// Register an already boxed factory
    ///
    /// # Errors
    ///
    /// Same as [`FactoryRegistry::register`].
    pub fn register_boxed(
        &mut self,
        resource_type: &str,
        factory: Box<dyn ResourceFactory>,
    ) -> Result<()> {
        if self.phase == RegistryPhase::Sealed {
            return Err(DriftwatchError::RegistrySealed {
                registry: "factory".to_string(),
                resource_type: resource_type.to_string(),
            });
        }
        if self.factories.contains_key(resource_type) {
            return Err(DriftwatchError::FactoryConflict {
                resource_type: resource_type.to_string(),
            });
        }
        tracing::debug!(resource_type, "factory registered");
        self.factories.insert(resource_type.to_string(), factory);
        Ok(())
    }

    /// Construct a canonical resource
    ///
    /// Types without a registered factory get the generic factory, which
    /// copies attributes verbatim.
    ///
    /// # Errors
    ///
    /// - whatever the type's factory reports for malformed input
    /// - `InternalInconsistency` if a factory returns a resource with a
    ///   different type or id than requested
    pub fn create(&self, resource_type: &str, id: &str, raw: Attributes) -> Result<Resource> {
        let Some(factory) = self.factories.get(resource_type) else {
            return Ok(generic_resource(resource_type, id, raw));
        };

        let resource = factory.create(id, raw)?;
        if resource.resource_type != resource_type || resource.id != id {
            return Err(DriftwatchError::InternalInconsistency {
                reason: format!(
                    "factory for {} returned {}.{} when asked for id {}",
                    resource_type, resource.resource_type, resource.id, id
                ),
            });
        }
        Ok(resource)
    }

    pub fn has_factory(&self, resource_type: &str) -> bool {
        self.factories.contains_key(resource_type)
    }

    pub fn types(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn seal(&mut self) {
        self.phase = RegistryPhase::Sealed;
    }

    pub fn is_sealed(&self) -> bool {
        self.phase == RegistryPhase::Sealed
    }
}

/// The fallback factory: attributes copied as-is
pub fn generic_resource(resource_type: &str, id: &str, raw: Attributes) -> Resource {
    Resource::new(resource_type, id, raw)
}
