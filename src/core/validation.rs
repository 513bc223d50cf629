//! Validation utilities for configuration values
//!
//! Provides the shared validation error type and small field validators used
//! when checking pipeline configuration before anything is started.

/// A configuration value failed validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    field: String,
    message: String,
    summary: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        Self {
            summary: format!("{field}: {message}"),
            field,
            message,
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Full human-readable description
    pub fn details(&self) -> String {
        self.to_string()
    }
}

impl crate::core::error_handling::ContextualError for ValidationError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        Some(&self.summary)
    }
}

/// Validate that a count is at least one
pub fn validate_positive(field: &str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::new(field, "value must be greater than 0"));
    }
    Ok(())
}

/// Validate that `min < max`
pub fn validate_range(field: &str, min: i64, max: i64) -> Result<(), ValidationError> {
    if min >= max {
        return Err(ValidationError::new(
            field,
            format!("minimum ({min}) must be less than maximum ({max})"),
        ));
    }
    Ok(())
}
