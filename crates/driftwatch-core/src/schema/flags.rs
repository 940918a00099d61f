use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Behavior flag attached to a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaFlag {
    /// Compare nested lists and maps element by element
    DeepMode,
    /// Resources of this type only exist after creation; live-only
    /// instances are never reported as unmanaged
    ComputedOnly,
    /// Excluded from comparison unless the flag is removed
    IgnoredByDefault,
}

impl fmt::Display for SchemaFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchemaFlag::DeepMode => "deep_mode",
            SchemaFlag::ComputedOnly => "computed_only",
            SchemaFlag::IgnoredByDefault => "ignored_by_default",
        };
        write!(f, "{}", name)
    }
}

/// Set of flags for one type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaFlags(BTreeSet<SchemaFlag>);

impl SchemaFlags {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, flag: SchemaFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn insert(&mut self, flag: SchemaFlag) -> bool {
        self.0.insert(flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = SchemaFlag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<SchemaFlag> for SchemaFlags {
    fn from_iter<I: IntoIterator<Item = SchemaFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<const N: usize> From<[SchemaFlag; N]> for SchemaFlags {
    fn from(flags: [SchemaFlag; N]) -> Self {
        flags.into_iter().collect()
    }
}

impl fmt::Display for SchemaFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", names.join("|"))
    }
}
