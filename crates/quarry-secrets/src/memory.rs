//! In-memory secret store for testing and local development.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{SecretsError, SecretsResult};
use crate::traits::{SecretMap, SecretStore};

/// In-memory [`SecretStore`] implementation.
///
/// Secrets are not persisted across restarts. Cloning shares the
/// underlying storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySecrets {
    data: Arc<RwLock<BTreeMap<String, SecretMap>>>,
}

impl MemorySecrets {
    /// Create an empty in-memory secret store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretStore for MemorySecrets {
    async fn get(&self, path: &str) -> SecretsResult<SecretMap> {
        let data = self.data.read().await;
        Ok(data.get(path).cloned().unwrap_or_default())
    }

    async fn put(&self, path: &str, value: SecretMap) -> SecretsResult<()> {
        let mut data = self.data.write().await;
        data.insert(path.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> SecretsResult<()> {
        let mut data = self.data.write().await;
        data.remove(path);
        Ok(())
    }

    async fn list(&self, path: &str) -> SecretsResult<Vec<String>> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .map(ToOwned::to_owned)
            .collect())
    }

    async fn clean_up(&self, path: &str) -> SecretsResult<()> {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(SecretsError::EmptyPrefix(path.to_owned()));
        }
        let prefix = format!("{trimmed}/");
        let mut data = self.data.write().await;
        data.retain(|k, _| k != trimmed && !k.starts_with(&prefix));
        Ok(())
    }
}
