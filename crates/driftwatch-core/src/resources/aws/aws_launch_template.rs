use crate::errors::Result;
use crate::model::{Attributes, Resource};
use crate::registry::TypeRegistration;
use crate::resources::validate;
use crate::schema::{ResourceSchema, SchemaFlag};

pub const AWS_LAUNCH_TEMPLATE: &str = "aws_launch_template";

/// Launch templates nest block device mappings and network interfaces;
/// they are compared element by element.
pub fn registration() -> TypeRegistration {
    let schema = ResourceSchema::new()
        .with_flag(SchemaFlag::DeepMode)
        .computed("arn")
        .computed("latest_version")
        .list_key("device_name")
        .list_key("device_index");

    TypeRegistration::new(AWS_LAUNCH_TEMPLATE, schema).with_factory(create)
}

/// # Errors
///
/// Returns `MalformedAttribute` when a nested collection has the wrong shape.
pub fn create(id: &str, mut raw: Attributes) -> Result<Resource> {
    validate::list_of_maps(AWS_LAUNCH_TEMPLATE, id, &mut raw, "block_device_mappings")?;
    validate::list_of_maps(AWS_LAUNCH_TEMPLATE, id, &mut raw, "network_interfaces")?;
    validate::list(AWS_LAUNCH_TEMPLATE, id, &mut raw, "vpc_security_group_ids")?;
    validate::map(AWS_LAUNCH_TEMPLATE, id, &mut raw, "tags")?;
    Ok(Resource::new(AWS_LAUNCH_TEMPLATE, id, raw))
}
