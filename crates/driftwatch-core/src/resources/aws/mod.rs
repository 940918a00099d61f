//! AWS resource types.

pub mod aws_db_instance;
pub mod aws_ebs_snapshot;
pub mod aws_ebs_volume;
pub mod aws_instance;
pub mod aws_launch_template;

use crate::registry::TypeRegistration;

pub use aws_db_instance::AWS_DB_INSTANCE;
pub use aws_ebs_snapshot::AWS_EBS_SNAPSHOT;
pub use aws_ebs_volume::AWS_EBS_VOLUME;
pub use aws_instance::AWS_INSTANCE;
pub use aws_launch_template::AWS_LAUNCH_TEMPLATE;

pub fn registrations() -> Vec<TypeRegistration> {
    vec![
        aws_db_instance::registration(),
        aws_ebs_snapshot::registration(),
        aws_ebs_volume::registration(),
        aws_instance::registration(),
        aws_launch_template::registration(),
    ]
}
