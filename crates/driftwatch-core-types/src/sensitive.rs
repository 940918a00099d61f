//! Sensitive data marker for automatic redaction
//!
//! `Sensitive<T>` keeps secrets (redaction salts, credentials handed to an
//! embedding caller) out of `Debug` and `Display` output.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use driftwatch_core_types::Sensitive;
///
/// let salt = Sensitive::new("pepper");
/// assert_eq!(format!("{:?}", salt), "***REDACTED***");
/// assert_eq!(salt.expose(), &"pepper");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    ///
    /// Only call this where the raw value is actually consumed, never
    /// to build a log line.
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Default> Default for Sensitive<T> {
    fn default() -> Self {
        Self(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("db-master-password");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("db-master"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let secret = Sensitive::new("salt-12345");
        assert_eq!(format!("{}", secret), "***REDACTED***");
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("value"));
        assert_eq!(secret.expose(), "value");
        assert_eq!(secret.into_inner(), "value");
    }

    #[test]
    fn test_sensitive_inside_struct_debug() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Redactor {
            name: String,
            salt: Sensitive<Vec<u8>>,
        }

        let redactor = Redactor {
            name: "sensitive_field_redactor".to_string(),
            salt: Sensitive::new(b"pepper".to_vec()),
        };

        let debug_str = format!("{:?}", redactor);
        assert!(debug_str.contains("sensitive_field_redactor"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("112"));
    }
}
