pub mod attributes;
pub mod resource;
pub mod set;
pub mod value;

pub use attributes::Attributes;
pub use resource::{Resource, ResourceKey};
pub use set::ResourceSet;
pub use value::AttrValue;
