//! Built-in resource type modules.
//!
//! Each type module exposes a `registration()` bundle; nothing is
//! registered implicitly.

pub mod aws;
pub mod validate;

use crate::errors::Result;
use crate::registry::TypeRegistry;

/// Register every built-in resource type
///
/// # Errors
///
/// Fails with `SchemaConflict` / `FactoryConflict` if a caller already
/// registered one of the built-in types differently.
pub fn register_builtin(registry: &mut TypeRegistry) -> Result<()> {
    registry.register_all(aws::registrations())
}

/// A sealed registry holding only the built-in types
///
/// # Errors
///
/// Propagates registration conflicts from [`register_builtin`].
pub fn builtin_registry() -> Result<TypeRegistry> {
    let mut registry = TypeRegistry::new();
    register_builtin(&mut registry)?;
    registry.seal();
    Ok(registry)
}
