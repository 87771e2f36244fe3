//! Trait for secret-store backend implementations.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::SecretsResult;

/// The value stored under a single secret path.
pub type SecretMap = BTreeMap<String, String>;

/// Encrypted key-value secret store, addressed by slash-separated paths
/// (e.g. `secret/acme/dev/author-0`).
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Read the mapping stored at `path`.
    ///
    /// A missing path reads as an empty mapping, not an error.
    async fn get(&self, path: &str) -> SecretsResult<SecretMap>;

    /// Write the mapping at `path`, replacing any previous value.
    async fn put(&self, path: &str, value: SecretMap) -> SecretsResult<()>;

    /// Delete the mapping at `path`. Deleting a missing path succeeds.
    async fn delete(&self, path: &str) -> SecretsResult<()>;

    /// List the immediate child keys under `path`.
    async fn list(&self, path: &str) -> SecretsResult<Vec<String>>;

    /// Recursively delete every mapping stored under `path`.
    ///
    /// An empty path is rejected with [`SecretsError::EmptyPrefix`]
    /// rather than clearing the whole store.
    ///
    /// [`SecretsError::EmptyPrefix`]: crate::SecretsError::EmptyPrefix
    async fn clean_up(&self, path: &str) -> SecretsResult<()>;
}
