//! driftwatch core - resource normalization and comparison engine
//!
//! This crate turns two raw resource collections (declared by
//! infrastructure-as-code state, and observed live in a cloud account) into
//! a structured drift changelog:
//! - Canonical resource model with an ordered attribute tree
//! - Schema repository and factory registry with a sealed lifecycle
//! - Built-in AWS resource type modules
//! - Middleware pipeline reconciling declared vs live shapes
//! - Type / resource / field ignore filter
//! - Deterministic, path-addressable diff engine
//!
//! The core performs no I/O. Fetching resources and rendering reports are
//! left to the caller.

pub mod cancel;
pub mod diff;
pub mod errors;
pub mod factory;
pub mod filter;
pub mod logging_facility;
pub mod middleware;
pub mod model;
pub mod registry;
pub mod resources;
pub mod schema;

// Used by the logging macros
pub use driftwatch_core_types;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use diff::{compute_changelog, Change, ChangeKind, Changelog, DiffSummary};
pub use errors::{DriftwatchError, DwError, DwErrorKind, Result};
pub use filter::{Filter, IgnoreRule, NoFilter, RuleFilter};
pub use middleware::{Middleware, Pipeline, PipelineOptions, PipelineReport};
pub use model::{AttrValue, Attributes, Resource, ResourceKey, ResourceSet};
pub use registry::{TypeRegistration, TypeRegistry};
pub use schema::{ResourceSchema, SchemaFlag, SchemaFlags, SchemaRepository};
