use driftwatch_core::resources::builtin_registry;
use driftwatch_core::{Attributes, Resource, ResourceSet, TypeRegistry};
use serde_json::Value;

/// Attributes from a JSON object literal
#[allow(dead_code)]
pub fn attrs(value: Value) -> Attributes {
    Attributes::from_json(value).expect("test attributes must be a JSON object")
}

/// A resource built directly, bypassing factories
#[allow(dead_code)]
pub fn resource(resource_type: &str, id: &str, value: Value) -> Resource {
    Resource::new(resource_type, id, attrs(value))
}

/// A resource built through the registry's factory for its type
#[allow(dead_code)]
pub fn build(registry: &TypeRegistry, resource_type: &str, id: &str, value: Value) -> Resource {
    registry
        .factories()
        .create(resource_type, id, attrs(value))
        .expect("factory should accept test input")
}

#[allow(dead_code)]
pub fn set(resources: Vec<Resource>) -> ResourceSet {
    ResourceSet::from_resources(resources).expect("test resources must have unique keys")
}

/// Sealed registry with every built-in resource type
#[allow(dead_code)]
pub fn registry() -> TypeRegistry {
    builtin_registry().expect("built-in registrations never conflict")
}

#[allow(dead_code)]
pub fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}
