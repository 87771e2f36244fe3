//! Time-boxed signed download URLs for objects in external storage.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use http::Method;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::signer::Signer;

use crate::config::SignerSettings;
use crate::error::{ControlError, ControlResult};

/// Issues signed, expiring download URLs for stored objects.
#[async_trait]
pub trait UrlSigner: Send + Sync {
    /// Sign a GET for `key` in `bucket`, valid for `expiry`.
    async fn signed_url(&self, bucket: &str, key: &str, expiry: Duration) -> ControlResult<String>;
}

/// [`UrlSigner`] backed by S3-compatible object storage.
///
/// Credentials are taken from the ambient environment; region and
/// endpoint come from [`SignerSettings`].
#[derive(Debug, Clone)]
pub struct S3Signer {
    settings: SignerSettings,
}

impl S3Signer {
    /// Create a signer with the given settings.
    #[must_use]
    pub fn new(settings: SignerSettings) -> Self {
        Self { settings }
    }

    fn store(&self, bucket: &str) -> ControlResult<object_store::aws::AmazonS3> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.settings.region.clone())
            .with_bucket_name(bucket);
        if let Some(endpoint) = &self.settings.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
        }
        builder.build().map_err(|e| ControlError::signer(e.to_string()))
    }
}

#[async_trait]
impl UrlSigner for S3Signer {
    async fn signed_url(&self, bucket: &str, key: &str, expiry: Duration) -> ControlResult<String> {
        let store = self.store(bucket)?;
        let url = store
            .signed_url(Method::GET, &Path::from(key), expiry)
            .await
            .map_err(|e| ControlError::signer(e.to_string()))?;
        Ok(url.to_string())
    }
}

/// Deterministic signer for tests and local development. Counts calls
/// so callers can assert that no links were issued.
#[derive(Debug, Default)]
pub struct StaticSigner {
    calls: AtomicUsize,
}

impl StaticSigner {
    /// Create a static signer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs issued so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrlSigner for StaticSigner {
    async fn signed_url(&self, bucket: &str, key: &str, expiry: Duration) -> ControlResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://storage.invalid/{bucket}/{key}?expires={}",
            expiry.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_signer_counts_calls() {
        let signer = StaticSigner::new();
        assert_eq!(signer.call_count(), 0);
        let url = signer
            .signed_url("quarry-boxes", "demo/box.zip", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(
            url,
            "https://storage.invalid/quarry-boxes/demo/box.zip?expires=3600"
        );
        assert_eq!(signer.call_count(), 1);
    }
}
