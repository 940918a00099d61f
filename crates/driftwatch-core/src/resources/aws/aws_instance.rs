use crate::errors::Result;
use crate::model::{Attributes, Resource};
use crate::registry::TypeRegistration;
use crate::resources::validate;
use crate::schema::ResourceSchema;

pub const AWS_INSTANCE: &str = "aws_instance";

/// Inline description of the root volume
pub const ROOT_BLOCK_DEVICE: &str = "root_block_device";
/// Inline descriptions of additional EBS volumes
pub const EBS_BLOCK_DEVICE: &str = "ebs_block_device";
/// Tags applied to every attached volume
pub const VOLUME_TAGS: &str = "volume_tags";

pub fn registration() -> TypeRegistration {
    let schema = ResourceSchema::new()
        .computed("arn")
        .computed("instance_state")
        .computed("primary_network_interface_id")
        .computed("private_dns")
        .computed("private_ip")
        .computed("public_dns")
        .computed("public_ip")
        .sensitive("password_data")
        .default_value("get_password_data", false)
        .default_value("monitoring", false)
        .default_value("source_dest_check", true)
        .list_key("device_name");

    TypeRegistration::new(AWS_INSTANCE, schema).with_factory(create)
}

/// # Errors
///
/// Returns `MalformedAttribute` when a block device attribute is not a list
/// of maps or a tag attribute is not a map.
pub fn create(id: &str, mut raw: Attributes) -> Result<Resource> {
    validate::list_of_maps(AWS_INSTANCE, id, &mut raw, ROOT_BLOCK_DEVICE)?;
    validate::list_of_maps(AWS_INSTANCE, id, &mut raw, EBS_BLOCK_DEVICE)?;
    validate::map(AWS_INSTANCE, id, &mut raw, "tags")?;
    validate::map(AWS_INSTANCE, id, &mut raw, VOLUME_TAGS)?;
    Ok(Resource::new(AWS_INSTANCE, id, raw))
}
