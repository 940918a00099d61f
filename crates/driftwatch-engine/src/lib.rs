//! driftwatch engine - scan orchestration
//!
//! Coordinates the core layers for one drift scan: builds canonical
//! resources through the registry, runs the middleware pipeline, and
//! spreads the per-type diff units over a thread pool. Lifecycle logging
//! for a scan lives here; the core only emits debug events.

pub mod commands;
pub mod config;

pub use commands::scan::{DriftScanner, RawResource, ScanInput, ScanOutcome};
pub use config::{Direction, ScanConfig};
