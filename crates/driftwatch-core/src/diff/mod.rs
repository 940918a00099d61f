//! Drift diff engine.
//!
//! Compares two canonical resource sets (`before`, `after`) and produces a
//! path-addressable [`Changelog`](model::Changelog).
//!
//! # Guarantees
//!
//! - **Identity matching**: resources pair up by `(type, id)` only, never
//!   by attribute similarity
//! - **Determinism**: types, ids and attribute keys are visited in
//!   lexicographic order; same inputs give byte-identical serialized output
//! - **Symmetry**: swapping `before` and `after` swaps `Created`/`Deleted`
//!   and `from`/`to`, with the same set of paths (computed-only fields and
//!   `ComputedOnly` types excepted)
//! - **Filter completeness**: an ignored type, resource or path never
//!   produces an entry, at any depth

pub mod engine;
pub mod model;

pub use engine::{compute_changelog, compute_changelog_for_type, diff_units, DEFAULT_LIST_KEYS};
pub use model::{Change, ChangeKind, Changelog, DiffSummary};
