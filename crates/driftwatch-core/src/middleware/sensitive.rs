//! Sensitive value redaction.
//!
//! Values of schema-declared sensitive fields are replaced by a digest of
//! their canonical JSON. Equal secrets still compare equal, different ones
//! still show up as drift, and the plaintext never reaches a changelog.

use crate::errors::DwError;
use crate::model::{AttrValue, ResourceSet};
use crate::registry::TypeRegistry;
use crate::schema::SchemaRepository;
use driftwatch_core_types::Sensitive;
use sha2::{Digest as _, Sha256};

use super::Middleware;

pub const STAGE_NAME: &str = "sensitive_field_redactor";

/// Prefix marking an already redacted value
pub const REDACTED_PREFIX: &str = "sha256:";

/// Hex length of a SHA-256 digest
const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct SensitiveFieldRedactor {
    salt: Sensitive<Vec<u8>>,
}

impl SensitiveFieldRedactor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mix a secret salt into every digest
    pub fn with_salt(salt: impl Into<Vec<u8>>) -> Self {
        Self {
            salt: Sensitive::new(salt.into()),
        }
    }

    /// Digest marker for one value
    pub fn redact(&self, value: &AttrValue) -> AttrValue {
        let mut hasher = Sha256::new();
        hasher.update(self.salt.expose());
        hasher.update(value.canonical_json().as_bytes());
        AttrValue::String(format!("{}{}", REDACTED_PREFIX, hex::encode(hasher.finalize())))
    }

    fn redact_set(&self, schema: &SchemaRepository, set: &mut ResourceSet) -> usize {
        let mut redacted = 0;
        for resource in set.iter_mut() {
            for field in schema.sensitive_fields(&resource.resource_type) {
                let Some(value) = resource.attributes.get_mut(field) else {
                    continue;
                };
                if value.is_null() || is_redacted(value) {
                    continue;
                }
                *value = self.redact(value);
                redacted += 1;
            }
        }
        redacted
    }
}

/// A redaction marker is the prefix followed by a full lowercase hex digest;
/// any other value carrying the prefix is plaintext
fn is_redacted(value: &AttrValue) -> bool {
    value
        .as_str()
        .and_then(|s| s.strip_prefix(REDACTED_PREFIX))
        .is_some_and(|digest| {
            digest.len() == DIGEST_HEX_LEN
                && digest.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        })
}

impl Middleware for SensitiveFieldRedactor {
    fn name(&self) -> &'static str {
        STAGE_NAME
    }

    fn execute(
        &self,
        registry: &TypeRegistry,
        declared: &mut ResourceSet,
        live: &mut ResourceSet,
    ) -> Vec<DwError> {
        let redacted =
            self.redact_set(registry.schema(), declared) + self.redact_set(registry.schema(), live);
        tracing::debug!(stage = STAGE_NAME, redacted, "sensitive fields redacted");
        Vec::new()
    }
}
