//! Scan configuration
//!
//! Parsed from YAML and validated up front, so a scan never starts with a
//! configuration it would reject halfway through. Where the YAML comes
//! from (file, env, embedded default) is up to the caller.
//!
//! ```yaml
//! direction: declared_to_live
//! strict: false
//! jobs: 8
//! log_profile: production
//! ignore:
//!   - aws_ebs_snapshot
//!   - aws_instance.*.tags.LastScanned
//! ```

use driftwatch_core::errors::{DwError, DwErrorKind};
use driftwatch_core::logging_facility::{self, Profile};
use driftwatch_core::RuleFilter;
use serde::{Deserialize, Serialize};

/// Worker threads used for the diff phase when none are configured
pub const DEFAULT_JOBS: usize = 4;

/// Which side of the comparison is `before`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Declared state is `before`: live-only resources are `Created`
    /// (unmanaged), declared-only resources are `Deleted` (missing)
    #[default]
    DeclaredToLive,
    /// Live state is `before`
    LiveToDeclared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub direction: Direction,

    /// Escalate the first construction or stage error to a scan failure
    pub strict: bool,

    /// Diff worker threads, at least 1
    pub jobs: usize,

    /// Drift-ignore lines
    pub ignore: Vec<String>,

    pub log_profile: Profile,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            strict: false,
            jobs: DEFAULT_JOBS,
            ignore: Vec::new(),
            log_profile: Profile::default(),
        }
    }
}

impl ScanConfig {
    /// Parse and validate a YAML document; an empty document yields the
    /// defaults
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` for YAML errors, unknown keys or `jobs: 0`
    /// - `InvalidIgnoreRule` for an unparseable ignore line
    pub fn from_yaml_str(content: &str) -> Result<Self, DwError> {
        let config: ScanConfig = if content.trim().is_empty() {
            ScanConfig::default()
        } else {
            serde_yaml::from_str(content)
                .map_err(|e| invalid_config(format!("YAML parse error: {}", e)))?
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Same as [`ScanConfig::from_yaml_str`], minus parsing.
    pub fn validate(&self) -> Result<(), DwError> {
        if self.jobs == 0 {
            return Err(invalid_config("jobs must be at least 1").with_field("jobs"));
        }
        self.filter().map(|_| ())
    }

    /// Compile the ignore lines
    ///
    /// # Errors
    ///
    /// Returns `InvalidIgnoreRule` for the first bad line.
    pub fn filter(&self) -> Result<RuleFilter, DwError> {
        RuleFilter::from_lines(self.ignore.iter().map(String::as_str)).map_err(DwError::from)
    }

    /// Install the logging subscriber for `log_profile`
    pub fn init_logging(&self) {
        logging_facility::init(self.log_profile);
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_ignore(mut self, line: impl Into<String>) -> Self {
        self.ignore.push(line.into());
        self
    }
}

fn invalid_config(message: impl Into<String>) -> DwError {
    DwError::new(DwErrorKind::InvalidConfig)
        .with_op("load_scan_config")
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_core::Filter;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = ScanConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config, ScanConfig::default());
        assert_eq!(config.jobs, DEFAULT_JOBS);
        assert_eq!(config.direction, Direction::DeclaredToLive);
    }

    #[test]
    fn test_partial_document_keeps_other_defaults() {
        let config = ScanConfig::from_yaml_str("strict: true\n").unwrap();
        assert!(config.strict);
        assert_eq!(config.jobs, DEFAULT_JOBS);
    }

    #[test]
    fn test_zero_jobs_rejected() {
        let err = ScanConfig::from_yaml_str("jobs: 0").unwrap_err();
        assert_eq!(err.kind(), DwErrorKind::InvalidConfig);
        assert_eq!(err.field(), Some("jobs"));
    }

    #[test]
    fn test_filter_compiles_ignore_lines() {
        let config = ScanConfig::default().with_ignore("aws_ebs_snapshot");
        assert!(config.filter().unwrap().is_type_ignored("aws_ebs_snapshot"));
    }
}
