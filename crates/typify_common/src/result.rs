//! Common result and error types for the Typify adapter.

/// The standard result type for operations that can only fail on a bug.
///
/// `Err` indicates an internal error (a broken invariant or a caller handing
/// the adapter malformed input), not a user-facing compile error. Compile
/// errors travel as diagnostics.
pub type TypifyResult<T> = Result<T, InternalError>;

/// An internal error indicating a bug in Typify or its host, not a problem
/// with the user's sources.
#[derive(Debug, thiserror::Error)]
#[error("internal adapter error: {message}")]
pub struct InternalError {
    /// Description of the internal error.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}
