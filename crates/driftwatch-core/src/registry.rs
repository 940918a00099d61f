//! Type registry: schema metadata and factories registered together.
//!
//! Each resource type module contributes one [`TypeRegistration`]. The
//! bundle is registered during process start, sealed, and then shared
//! read-only by every scan.

use crate::errors::{DriftwatchError, Result};
use crate::factory::{FactoryRegistry, ResourceFactory};
use crate::schema::{ResourceSchema, SchemaRepository};
use std::sync::OnceLock;

/// Everything one resource type contributes to the registry
pub struct TypeRegistration {
    pub resource_type: &'static str,
    pub schema: ResourceSchema,
    pub factory: Option<Box<dyn ResourceFactory>>,
}

impl TypeRegistration {
    pub fn new(resource_type: &'static str, schema: ResourceSchema) -> Self {
        Self {
            resource_type,
            schema,
            factory: None,
        }
    }

    pub fn with_factory(mut self, factory: impl ResourceFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }
}

/// Schema repository and factory registry for one process
#[derive(Debug, Default)]
pub struct TypeRegistry {
    schema: SchemaRepository,
    factories: FactoryRegistry,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one type's schema and (optional) factory
    ///
    /// # Errors
    ///
    /// Propagates `SchemaConflict`, `FactoryConflict` and `RegistrySealed`.
    pub fn register(&mut self, registration: TypeRegistration) -> Result<()> {
        let TypeRegistration {
            resource_type,
            schema,
            factory,
        } = registration;

        self.schema.register(resource_type, schema)?;
        if let Some(factory) = factory {
            self.factories.register_boxed(resource_type, factory)?;
        }
        Ok(())
    }

    /// Register several types, stopping at the first conflict
    ///
    /// # Errors
    ///
    /// Same as [`TypeRegistry::register`].
    pub fn register_all(
        &mut self,
        registrations: impl IntoIterator<Item = TypeRegistration>,
    ) -> Result<()> {
        for registration in registrations {
            self.register(registration)?;
        }
        Ok(())
    }

    pub fn schema(&self) -> &SchemaRepository {
        &self.schema
    }

    /// Mutable access for callers registering flags directly
    pub fn schema_mut(&mut self) -> &mut SchemaRepository {
        &mut self.schema
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn factories_mut(&mut self) -> &mut FactoryRegistry {
        &mut self.factories
    }

    /// Seal both registries; further registration fails
    pub fn seal(&mut self) {
        self.schema.seal();
        self.factories.seal();
    }

    pub fn is_sealed(&self) -> bool {
        self.schema.is_sealed() && self.factories.is_sealed()
    }

    /// Fail unless registration is finished
    ///
    /// # Errors
    ///
    /// Returns `RegistryNotSealed` naming the registry still open.
    pub fn ensure_sealed(&self) -> Result<()> {
        if !self.schema.is_sealed() {
            return Err(DriftwatchError::RegistryNotSealed {
                registry: "schema".to_string(),
            });
        }
        if !self.factories.is_sealed() {
            return Err(DriftwatchError::RegistryNotSealed {
                registry: "factory".to_string(),
            });
        }
        Ok(())
    }
}

static GLOBAL_REGISTRY: OnceLock<TypeRegistry> = OnceLock::new();

/// Seal `registry` and publish it as the process-wide registry
///
/// # Errors
///
/// Returns `RegistrySealed` if a registry was already installed.
pub fn install_global(mut registry: TypeRegistry) -> Result<&'static TypeRegistry> {
    registry.seal();
    let mut installed = false;
    let global = GLOBAL_REGISTRY.get_or_init(|| {
        installed = true;
        registry
    });
    if !installed {
        return Err(DriftwatchError::RegistrySealed {
            registry: "global".to_string(),
            resource_type: "*".to_string(),
        });
    }
    tracing::debug!(types = global.schema.types().len(), "global type registry installed");
    Ok(global)
}

/// The process-wide registry, if one was installed
pub fn global() -> Option<&'static TypeRegistry> {
    GLOBAL_REGISTRY.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Resource};
    use crate::schema::SchemaFlag;

    #[test]
    fn test_registration_bundle_populates_both_registries() {
        let mut registry = TypeRegistry::new();
        registry
            .register(
                TypeRegistration::new(
                    "aws_thing",
                    ResourceSchema::new().with_flag(SchemaFlag::DeepMode),
                )
                .with_factory(|id: &str, raw: Attributes| Ok(Resource::new("aws_thing", id, raw))),
            )
            .unwrap();

        assert!(registry.schema().has_flag("aws_thing", SchemaFlag::DeepMode));
        assert!(registry.factories().has_factory("aws_thing"));
    }

    #[test]
    fn test_ensure_sealed_names_open_registry() {
        let mut registry = TypeRegistry::new();
        let err = registry.ensure_sealed().unwrap_err();
        assert_eq!(
            err,
            DriftwatchError::RegistryNotSealed {
                registry: "schema".to_string()
            }
        );

        registry.seal();
        assert!(registry.ensure_sealed().is_ok());
        assert!(registry.is_sealed());
    }
}
