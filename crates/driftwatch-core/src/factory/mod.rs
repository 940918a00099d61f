pub mod registry;

pub use registry::{generic_resource, FactoryRegistry, ResourceFactory};
