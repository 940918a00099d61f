use crate::registry::TypeRegistration;
use crate::schema::ResourceSchema;

pub const AWS_DB_INSTANCE: &str = "aws_db_instance";

/// Generic construction; `password` is redacted before comparison.
pub fn registration() -> TypeRegistration {
    let schema = ResourceSchema::new()
        .computed("address")
        .computed("arn")
        .computed("endpoint")
        .computed("hosted_zone_id")
        .computed("resource_id")
        .computed("status")
        .sensitive("password");

    TypeRegistration::new(AWS_DB_INSTANCE, schema)
}
