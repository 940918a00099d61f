use driftwatch_core::resources::builtin_registry;
use driftwatch_core::TypeRegistry;
use driftwatch_engine::RawResource;
use serde_json::{json, Value};

#[allow(dead_code)]
pub fn raw(resource_type: &str, id: &str, attributes: Value) -> RawResource {
    RawResource::new(resource_type, id, attributes)
}

/// Sealed registry with every built-in resource type
#[allow(dead_code)]
pub fn registry() -> TypeRegistry {
    builtin_registry().expect("built-in registrations never conflict")
}

/// Declared side of a small account: one instance with an inline root
/// volume
#[allow(dead_code)]
pub fn declared_account() -> Vec<RawResource> {
    vec![raw(
        "aws_instance",
        "i-1",
        json!({
            "availability_zone": "eu-west-3",
            "volume_tags": {"Name": "root"},
            "root_block_device": [{
                "volume_id": "v1",
                "volume_size": 8,
                "volume_type": "gp2",
                "device_name": "/dev/xvda",
                "delete_on_termination": true
            }]
        }),
    )]
}

/// Live side of the same account, plus one unmanaged volume `v9`
#[allow(dead_code)]
pub fn live_account() -> Vec<RawResource> {
    vec![
        raw(
            "aws_instance",
            "i-1",
            json!({
                "availability_zone": "eu-west-3",
                "arn": "arn:aws:ec2:eu-west-3:123:instance/i-1",
                "tags_all": {},
                "root_block_device": [{"volume_id": "v1", "volume_size": 8, "volume_type": "gp2"}]
            }),
        ),
        raw(
            "aws_ebs_volume",
            "v1",
            json!({
                "availability_zone": "eu-west-3",
                "arn": "arn:aws:ec2:eu-west-3:123:volume/v1",
                "multi_attach_enabled": false,
                "size": 8,
                "tags": {"Name": "root"},
                "type": "gp2"
            }),
        ),
        raw("aws_ebs_volume", "v9", json!({"size": 1})),
    ]
}
