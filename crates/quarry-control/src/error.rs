//! Error types for the provisioning layer.

use quarry_cluster::ClusterError;
use quarry_secrets::SecretsError;

/// Result type alias using [`ControlError`].
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors reported by controllers and the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The request is malformed or references unknown catalog entries.
    /// Raised before any collaborator is called.
    #[error("{0}")]
    Validation(String),

    /// The operation is not offered for this resource.
    #[error("operation not available")]
    NotSupported,

    /// A cluster API call failed.
    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// A secret-store call failed.
    #[error(transparent)]
    Secrets(#[from] SecretsError),

    /// Signed-URL generation failed.
    #[error("signer error: {0}")]
    Signer(String),

    /// A payload could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

impl ControlError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a signer error.
    #[must_use]
    pub fn signer(msg: impl Into<String>) -> Self {
        Self::Signer(msg.into())
    }

    /// Whether the failure is attributable to the caller's request
    /// rather than a collaborator.
    #[must_use]
    pub const fn is_client_fault(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_client_fault() {
        assert!(ControlError::validation("image is required").is_client_fault());
        assert!(!ControlError::signer("boom").is_client_fault());
    }
}
