//! Correlation types for scan tracking and tracing
//!
//! Every drift scan carries a [`ScanId`] so that log lines, collected
//! errors and the final outcome can be tied back to a single run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single drift scan
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(String);

impl ScanId {
    /// Generate a new ScanId using UUIDv7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trace identifier supplied by a caller that embeds the scanner
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(String);

impl TraceId {
    /// Generate a new TraceId using UUIDv7
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through a scan for correlation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanContext {
    pub scan_id: ScanId,
    pub trace_id: Option<TraceId>,
}

impl ScanContext {
    /// Create a new context with a fresh ScanId
    pub fn new() -> Self {
        Self {
            scan_id: ScanId::new(),
            trace_id: None,
        }
    }

    /// Create a context with an existing ScanId
    pub fn with_scan_id(scan_id: ScanId) -> Self {
        Self {
            scan_id,
            trace_id: None,
        }
    }

    /// Attach a caller-provided TraceId
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }
}

impl Default for ScanContext {
    fn default() -> Self {
        Self::new()
    }
}
