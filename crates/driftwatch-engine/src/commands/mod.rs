//! Command orchestration layer.
//!
//! High-level entry points that coordinate the core's registry, pipeline
//! and diff engine for a caller.

pub mod scan;
