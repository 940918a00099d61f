use crate::registry::TypeRegistration;
use crate::schema::{ResourceSchema, SchemaFlag};

pub const AWS_EBS_SNAPSHOT: &str = "aws_ebs_snapshot";

/// Snapshots are mostly produced by backup tooling rather than IaC, so the
/// type is skipped unless a caller registers it without the flag.
pub fn registration() -> TypeRegistration {
    TypeRegistration::new(
        AWS_EBS_SNAPSHOT,
        ResourceSchema::new()
            .with_flag(SchemaFlag::IgnoredByDefault)
            .computed("arn"),
    )
}
