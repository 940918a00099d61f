//! Rule-based filter.
//!
//! Rules use the drift-ignore line syntax:
//!
//! ```text
//! aws_ebs_snapshot                  # every resource of a type
//! aws_instance.i-0abc               # one resource
//! aws_instance.*.tags.LastScanned   # one attribute path on every instance
//! aws_s3_bucket.my\.dotted\.bucket  # `\.` keeps a dot inside a segment
//! ```
//!
//! `*` matches exactly one type, id or path segment. A field rule also
//! ignores every path beneath it.

use crate::errors::{DriftwatchError, Result};
use crate::model::Resource;

use super::Filter;

const WILDCARD: &str = "*";

/// One ignore rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreRule {
    Type {
        resource_type: String,
    },
    Resource {
        resource_type: String,
        id: String,
    },
    Field {
        resource_type: String,
        id: String,
        path: Vec<String>,
    },
}

fn segment_matches(pattern: &str, value: &str) -> bool {
    pattern == WILDCARD || pattern == value
}

impl IgnoreRule {
    pub fn ignore_type(resource_type: impl Into<String>) -> Self {
        IgnoreRule::Type {
            resource_type: resource_type.into(),
        }
    }

    pub fn ignore_resource(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        IgnoreRule::Resource {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn ignore_field<S: Into<String>>(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        path: impl IntoIterator<Item = S>,
    ) -> Self {
        IgnoreRule::Field {
            resource_type: resource_type.into(),
            id: id.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse one drift-ignore line
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIgnoreRule` for blank lines, empty segments or a
    /// trailing escape.
    pub fn parse(line: &str) -> Result<Self> {
        let invalid = |reason: &str| DriftwatchError::InvalidIgnoreRule {
            rule: line.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Err(invalid("rule is empty"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = trimmed.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => return Err(invalid("dangling escape at end of rule")),
                },
                '.' => segments.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        segments.push(current);

        if segments.iter().any(String::is_empty) {
            return Err(invalid("empty segment"));
        }

        let mut segments = segments.into_iter();
        let resource_type = segments.next().unwrap_or_default();
        let Some(id) = segments.next() else {
            return Ok(IgnoreRule::Type { resource_type });
        };
        let path: Vec<String> = segments.collect();
        if path.is_empty() {
            Ok(IgnoreRule::Resource { resource_type, id })
        } else {
            Ok(IgnoreRule::Field {
                resource_type,
                id,
                path,
            })
        }
    }

    fn matches_type(&self, resource_type: &str) -> bool {
        match self {
            IgnoreRule::Type { resource_type: t } => segment_matches(t, resource_type),
            _ => false,
        }
    }

    fn matches_resource(&self, resource: &Resource) -> bool {
        match self {
            IgnoreRule::Type { .. } => self.matches_type(&resource.resource_type),
            IgnoreRule::Resource { resource_type, id } => {
                segment_matches(resource_type, &resource.resource_type)
                    && segment_matches(id, &resource.id)
            }
            IgnoreRule::Field { .. } => false,
        }
    }

    fn matches_field(&self, resource: &Resource, path: &[String]) -> bool {
        match self {
            IgnoreRule::Field {
                resource_type,
                id,
                path: pattern,
            } => {
                segment_matches(resource_type, &resource.resource_type)
                    && segment_matches(id, &resource.id)
                    && pattern.len() <= path.len()
                    && pattern
                        .iter()
                        .zip(path)
                        .all(|(p, segment)| segment_matches(p, segment))
            }
            _ => false,
        }
    }
}

/// Filter built from a list of ignore rules
#[derive(Debug, Clone, Default)]
pub struct RuleFilter {
    rules: Vec<IgnoreRule>,
}

impl RuleFilter {
    pub fn new(rules: Vec<IgnoreRule>) -> Self {
        Self { rules }
    }

    /// Parse drift-ignore lines; blank lines and `#` comments are skipped
    ///
    /// # Errors
    ///
    /// Returns the first `InvalidIgnoreRule`.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let rules = lines
            .into_iter()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(IgnoreRule::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn with_rule(mut self, rule: IgnoreRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }
}

impl Filter for RuleFilter {
    fn is_type_ignored(&self, resource_type: &str) -> bool {
        self.rules.iter().any(|r| r.matches_type(resource_type))
    }

    fn is_resource_ignored(&self, resource: &Resource) -> bool {
        self.rules.iter().any(|r| r.matches_resource(resource))
    }

    fn is_field_ignored(&self, resource: &Resource, path: &[String]) -> bool {
        self.rules.iter().any(|r| r.matches_field(resource, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_levels() {
        assert_eq!(
            IgnoreRule::parse("aws_ebs_volume").unwrap(),
            IgnoreRule::ignore_type("aws_ebs_volume")
        );
        assert_eq!(
            IgnoreRule::parse(" aws_instance.i-1 ").unwrap(),
            IgnoreRule::ignore_resource("aws_instance", "i-1")
        );
        assert_eq!(
            IgnoreRule::parse("aws_instance.*.tags.Name").unwrap(),
            IgnoreRule::ignore_field("aws_instance", "*", ["tags", "Name"])
        );
    }

    #[test]
    fn test_parse_escaped_dot() {
        assert_eq!(
            IgnoreRule::parse(r"aws_s3_bucket.my\.bucket").unwrap(),
            IgnoreRule::ignore_resource("aws_s3_bucket", "my.bucket")
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for line in ["", "   ", "aws_instance..tags", "aws_instance.", r"aws_instance\"] {
            let err = IgnoreRule::parse(line).unwrap_err();
            assert!(
                matches!(err, DriftwatchError::InvalidIgnoreRule { .. }),
                "line {:?} gave {:?}",
                line,
                err
            );
        }
    }

    #[test]
    fn test_from_lines_skips_comments() {
        let filter = RuleFilter::from_lines("# managed elsewhere\n\naws_ebs_snapshot\n".lines())
            .unwrap();
        assert_eq!(filter.rules(), &[IgnoreRule::ignore_type("aws_ebs_snapshot")]);
    }
}
