//! Error types for cluster operations.

/// Result type alias using [`ClusterError`].
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors reported by a cluster resource collaborator.
///
/// "Already exists" is a distinct, recoverable condition: callers surface
/// it descriptively instead of silently overwriting the resource.
#[derive(Debug, thiserror::Error)]
pub enum ClusterError {
    /// A resource with the same name already exists in the namespace.
    #[error("{kind} already exists: {name}")]
    AlreadyExists {
        /// Resource kind, e.g. "service" or "workload".
        kind: &'static str,
        /// Resource name.
        name: String,
    },

    /// The requested resource does not exist.
    #[error("{kind} not found: {name}")]
    NotFound {
        /// Resource kind.
        kind: &'static str,
        /// Resource name.
        name: String,
    },

    /// Any other failure reported by the cluster API.
    #[error("cluster API error: {0}")]
    Api(String),
}

impl ClusterError {
    /// Create an already-exists error.
    #[must_use]
    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a generic API error.
    #[must_use]
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Whether this error is the structured already-exists condition.
    #[must_use]
    pub const fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}
