pub mod flags;
pub mod repository;

pub use flags::{SchemaFlag, SchemaFlags};
pub use repository::{RegistryPhase, ResourceSchema, SchemaRepository};
