use crate::errors::Result;
use crate::model::{Attributes, Resource};
use crate::registry::TypeRegistration;
use crate::resources::validate;
use crate::schema::ResourceSchema;

pub const AWS_EBS_VOLUME: &str = "aws_ebs_volume";

pub fn registration() -> TypeRegistration {
    let schema = ResourceSchema::new()
        .computed("arn")
        .default_value("multi_attach_enabled", false);

    TypeRegistration::new(AWS_EBS_VOLUME, schema).with_factory(create)
}

/// # Errors
///
/// Returns `MalformedAttribute` when `size`, `iops` or `throughput` is not
/// numeric, a flag is not a bool, or `tags` is not a map.
pub fn create(id: &str, mut raw: Attributes) -> Result<Resource> {
    for field in ["size", "iops", "throughput"] {
        validate::number(AWS_EBS_VOLUME, id, &mut raw, field)?;
    }
    for field in ["encrypted", "multi_attach_enabled"] {
        validate::boolean(AWS_EBS_VOLUME, id, &mut raw, field)?;
    }
    validate::map(AWS_EBS_VOLUME, id, &mut raw, "tags")?;
    Ok(Resource::new(AWS_EBS_VOLUME, id, raw))
}
