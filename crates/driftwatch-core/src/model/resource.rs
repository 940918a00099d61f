use serde::{Deserialize, Serialize};
use std::fmt;

use super::attributes::Attributes;

/// Identity of a resource: `(type, id)`
///
/// Orders by type, then id. This is the only key used to match resources
/// across the declared and live sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceKey {
    pub resource_type: String,
    pub id: String,
}

impl ResourceKey {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.id)
    }
}

/// Canonical resource
///
/// A typed, identified attribute tree. Produced by a factory from raw
/// enumerated data and reshaped by middleware before comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Natural identifier, unique within the resource type
    pub id: String,

    /// Resource kind tag (e.g. `aws_instance`)
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Attribute tree
    pub attributes: Attributes,
}

impl Resource {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        attributes: Attributes,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            attributes,
        }
    }

    pub fn key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_type.clone(), self.id.clone())
    }

    /// Whether this resource is identified by `key`
    pub fn has_key(&self, key: &ResourceKey) -> bool {
        self.resource_type == key.resource_type && self.id == key.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_orders_by_type_then_id() {
        let mut keys = vec![
            ResourceKey::new("aws_instance", "i-2"),
            ResourceKey::new("aws_ebs_volume", "vol-9"),
            ResourceKey::new("aws_instance", "i-1"),
        ];
        keys.sort();

        let rendered: Vec<String> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["aws_ebs_volume.vol-9", "aws_instance.i-1", "aws_instance.i-2"]
        );
    }

    #[test]
    fn test_resource_serializes_type_field() {
        let resource = Resource::new("aws_instance", "i-1", Attributes::new());
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["type"], "aws_instance");
        assert_eq!(json["id"], "i-1");
        assert!(resource.has_key(&ResourceKey::new("aws_instance", "i-1")));
    }
}
