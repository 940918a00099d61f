use driftwatch_core_types::ScanId;
use thiserror::Error;

/// Result type alias using DriftwatchError
pub type Result<T> = std::result::Result<T, DriftwatchError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on without
/// parsing messages. Collected errors (pipeline stages, scan warnings) are
/// always reported through [`DwError`] carrying one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DwErrorKind {
    // Input / construction
    InvalidInput,
    MalformedAttribute,
    MissingAttribute,
    DuplicateResource,

    // Registration
    SchemaConflict,
    FactoryConflict,
    RegistrySealed,
    RegistryNotSealed,

    // Pipeline / diff
    StageFailed,
    InternalInconsistency,
    Cancelled,

    // Configuration
    InvalidConfig,
    InvalidIgnoreRule,

    Serialization,

    // Internal
    Internal,
}

impl DwErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            DwErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            DwErrorKind::MalformedAttribute => "ERR_MALFORMED_ATTRIBUTE",
            DwErrorKind::MissingAttribute => "ERR_MISSING_ATTRIBUTE",
            DwErrorKind::DuplicateResource => "ERR_DUPLICATE_RESOURCE",
            DwErrorKind::SchemaConflict => "ERR_SCHEMA_CONFLICT",
            DwErrorKind::FactoryConflict => "ERR_FACTORY_CONFLICT",
            DwErrorKind::RegistrySealed => "ERR_REGISTRY_SEALED",
            DwErrorKind::RegistryNotSealed => "ERR_REGISTRY_NOT_SEALED",
            DwErrorKind::StageFailed => "ERR_STAGE_FAILED",
            DwErrorKind::InternalInconsistency => "ERR_INTERNAL_INCONSISTENCY",
            DwErrorKind::Cancelled => "ERR_CANCELLED",
            DwErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            DwErrorKind::InvalidIgnoreRule => "ERR_INVALID_IGNORE_RULE",
            DwErrorKind::Serialization => "ERR_SERIALIZATION",
            DwErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether an error of this kind aborts a scan before any comparison
    ///
    /// Registration faults are configuration errors; everything else is
    /// collected and reported next to partial results.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            DwErrorKind::SchemaConflict
                | DwErrorKind::FactoryConflict
                | DwErrorKind::RegistrySealed
                | DwErrorKind::RegistryNotSealed
                | DwErrorKind::InvalidConfig
                | DwErrorKind::InvalidIgnoreRule
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus the resource context needed to act on a
/// collected error: which stage raised it, for which `(type, id)`, and at
/// which attribute path.
#[derive(Debug, Clone, PartialEq)]
pub struct DwError {
    kind: DwErrorKind,
    op: Option<String>,
    stage: Option<String>,
    resource_type: Option<String>,
    resource_id: Option<String>,
    field: Option<String>,
    scan_id: Option<ScanId>,
    message: String,
    source: Option<Box<DwError>>,
}

impl DwError {
    /// Create a new error with the specified kind
    pub fn new(kind: DwErrorKind) -> Self {
        Self {
            kind,
            op: None,
            stage: None,
            resource_type: None,
            resource_id: None,
            field: None,
            scan_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the name of the pipeline stage that raised the error
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Add the offending attribute (dotted path for nested fields)
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_scan_id(mut self, scan_id: ScanId) -> Self {
        self.scan_id = Some(scan_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: DwError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> DwErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn stage(&self) -> Option<&str> {
        self.stage.as_deref()
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn scan_id(&self) -> Option<&ScanId> {
        self.scan_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&DwError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for DwError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if let Some(stage) = &self.stage {
            write!(f, " at stage '{}'", stage)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        match (&self.resource_type, &self.resource_id) {
            (Some(ty), Some(id)) => write!(f, " (resource: {}.{})", ty, id)?,
            (Some(ty), None) => write!(f, " (resource_type: {})", ty)?,
            (None, Some(id)) => write!(f, " (resource_id: {})", id)?,
            (None, None) => {}
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        Ok(())
    }
}

impl std::error::Error for DwError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Error taxonomy for driftwatch core operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftwatchError {
    // ===== Construction Errors =====
    /// An attribute has the wrong shape (e.g. a scalar where a list is expected)
    #[error("Malformed attribute '{field}' on {resource_type}.{resource_id}: expected {expected}, found {found}")]
    MalformedAttribute {
        resource_type: String,
        resource_id: String,
        field: String,
        expected: String,
        found: String,
    },

    /// A required attribute is absent
    #[error("Missing attribute '{field}' on {resource_type}.{resource_id}")]
    MissingAttribute {
        resource_type: String,
        resource_id: String,
        field: String,
    },

    /// Two resources share the same (type, id) within one set
    #[error("Duplicate resource: {resource_type}.{resource_id}")]
    DuplicateResource {
        resource_type: String,
        resource_id: String,
    },

    /// Raw input that cannot be turned into attributes at all
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    // ===== Registration Errors =====
    /// Conflicting schema metadata registered for a type
    #[error("Schema conflict for type {resource_type}: {reason}")]
    SchemaConflict {
        resource_type: String,
        reason: String,
    },

    /// A second factory registered for a type
    #[error("Factory already registered for type {resource_type}")]
    FactoryConflict { resource_type: String },

    /// Registration attempted after the registry was sealed
    #[error("Registry '{registry}' is sealed; cannot register {resource_type}")]
    RegistrySealed {
        registry: String,
        resource_type: String,
    },

    /// A scan was attempted before registration finished
    #[error("Registry '{registry}' is not sealed")]
    RegistryNotSealed { registry: String },

    // ===== Pipeline / Diff Errors =====
    /// A structural invariant broke inside the engine
    #[error("Internal inconsistency: {reason}")]
    InternalInconsistency { reason: String },

    /// Ignore rule text that cannot be parsed
    #[error("Invalid ignore rule '{rule}': {reason}")]
    InvalidIgnoreRule { rule: String, reason: String },

    // ===== Other =====
    /// Serialization failure
    #[error("Serialization error: {reason}")]
    Serialization { reason: String },

    /// Internal error (should not happen)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<DriftwatchError> for DwError {
    fn from(err: DriftwatchError) -> Self {
        let message = err.to_string();
        match err {
            DriftwatchError::MalformedAttribute {
                resource_type,
                resource_id,
                field,
                ..
            } => DwError::new(DwErrorKind::MalformedAttribute)
                .with_resource_type(resource_type)
                .with_resource_id(resource_id)
                .with_field(field)
                .with_message(message),

            DriftwatchError::MissingAttribute {
                resource_type,
                resource_id,
                field,
            } => DwError::new(DwErrorKind::MissingAttribute)
                .with_resource_type(resource_type)
                .with_resource_id(resource_id)
                .with_field(field)
                .with_message(message),

            DriftwatchError::DuplicateResource {
                resource_type,
                resource_id,
            } => DwError::new(DwErrorKind::DuplicateResource)
                .with_resource_type(resource_type)
                .with_resource_id(resource_id)
                .with_message(message),

            DriftwatchError::InvalidInput { .. } => {
                DwError::new(DwErrorKind::InvalidInput).with_message(message)
            }

            DriftwatchError::SchemaConflict { resource_type, .. } => {
                DwError::new(DwErrorKind::SchemaConflict)
                    .with_resource_type(resource_type)
                    .with_op("register_schema")
                    .with_message(message)
            }

            DriftwatchError::FactoryConflict { resource_type } => {
                DwError::new(DwErrorKind::FactoryConflict)
                    .with_resource_type(resource_type)
                    .with_op("register_factory")
                    .with_message(message)
            }

            DriftwatchError::RegistrySealed { resource_type, .. } => {
                DwError::new(DwErrorKind::RegistrySealed)
                    .with_resource_type(resource_type)
                    .with_message(message)
            }

            DriftwatchError::RegistryNotSealed { .. } => {
                DwError::new(DwErrorKind::RegistryNotSealed).with_message(message)
            }

            DriftwatchError::InternalInconsistency { .. } => {
                DwError::new(DwErrorKind::InternalInconsistency).with_message(message)
            }

            DriftwatchError::InvalidIgnoreRule { .. } => {
                DwError::new(DwErrorKind::InvalidIgnoreRule)
                    .with_op("parse_ignore_rule")
                    .with_message(message)
            }

            DriftwatchError::Serialization { .. } => {
                DwError::new(DwErrorKind::Serialization).with_message(message)
            }

            DriftwatchError::Internal { .. } => {
                DwError::new(DwErrorKind::Internal).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for DriftwatchError {
    fn from(err: serde_json::Error) -> Self {
        DriftwatchError::Serialization {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DwError {
    fn from(err: serde_json::Error) -> Self {
        DwError::new(DwErrorKind::Serialization).with_message(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_kinds_are_configuration_errors() {
        assert!(DwErrorKind::SchemaConflict.is_configuration_error());
        assert!(DwErrorKind::RegistryNotSealed.is_configuration_error());
        assert!(!DwErrorKind::MalformedAttribute.is_configuration_error());
        assert!(!DwErrorKind::InternalInconsistency.is_configuration_error());
    }

    #[test]
    fn test_display_includes_stage_and_resource() {
        let err = DwError::new(DwErrorKind::MissingAttribute)
            .with_stage("aws_instance_block_device")
            .with_resource_type("aws_instance")
            .with_resource_id("i-1")
            .with_field("root_block_device.0.volume_id")
            .with_message("volume_id missing");

        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_MISSING_ATTRIBUTE]"));
        assert!(rendered.contains("at stage 'aws_instance_block_device'"));
        assert!(rendered.contains("(resource: aws_instance.i-1)"));
        assert!(rendered.contains("(field: root_block_device.0.volume_id)"));
    }

    #[test]
    fn test_source_chain_is_exposed() {
        use std::error::Error as _;

        let inner = DwError::new(DwErrorKind::MalformedAttribute);
        let outer = DwError::new(DwErrorKind::StageFailed).with_source(inner.clone());

        assert_eq!(outer.source_error(), Some(&inner));
        assert!(outer.source().is_some());
    }
}
