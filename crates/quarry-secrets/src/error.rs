//! Error types for secret-store operations.

/// Result type alias using [`SecretsError`].
pub type SecretsResult<T> = Result<T, SecretsError>;

/// Errors reported by a secret-store backend.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    /// Backend connection or transport failure.
    #[error("secret store error: {0}")]
    Backend(String),

    /// Clean-up was requested with an empty path prefix.
    #[error("cannot clean up an empty path prefix: {0:?}")]
    EmptyPrefix(String),
}

impl SecretsError {
    /// Create a backend error.
    #[must_use]
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
