//! Generic error handling utilities
//!
//! Lets the binary report any error from the library with the right amount of
//! detail: user-fixable problems (bad configuration) show their own message,
//! system failures show the operation context and keep details at debug level.

/// Trait for errors that can distinguish between user-actionable and system errors
///
/// When `is_user_actionable()` returns `true`, `user_message()` must return
/// `Some(message)`; otherwise it returns `None`.
pub trait ContextualError: std::error::Error {
    /// Returns true if the error carries a message the user can act on
    /// (invalid configuration values, unreadable config file, ...)
    fn is_user_actionable(&self) -> bool;

    /// The message to show the user for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Build the primary line reported for a fatal error
pub fn fatal_message<E: ContextualError>(error: &E, operation_context: &str) -> String {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            format!("{operation_context}: {user_msg}")
        }
        _ => operation_context.to_string(),
    }
}

/// Log errors with appropriate detail level based on error specificity
///
/// # Examples
/// ```rust,no_run
/// # use prodcons::core::error_handling::log_error_with_context;
/// # use prodcons::core::validation::ValidationError;
/// let err = ValidationError::new("producer-count", "value must be greater than 0");
/// log_error_with_context(&err, "Invalid configuration");
/// // Logs: "FATAL: Invalid configuration: producer-count: value must be greater than 0"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    log::error!("FATAL: {}", fatal_message(error, operation_context));
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
