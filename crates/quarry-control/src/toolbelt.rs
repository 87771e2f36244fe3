//! Toolbelt controller.
//!
//! The toolbelt is a time-boxed signed download link for the client's
//! tool bundle, persisted in a namespace secret so it can be read back
//! until it expires. Creating it again regenerates the link.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quarry_cluster::{ClusterClient, Metadata, SecretResource};
use quarry_core::types::Toolbelt;
use tracing::info;

use crate::config::ToolbeltSettings;
use crate::controllers::check_client;
use crate::error::ControlResult;
use crate::signer::UrlSigner;

const SECRET_NAME: &str = "toolbelt";

/// Issues and stores toolbelt bundles.
pub struct ToolbeltController {
    cluster: Arc<dyn ClusterClient>,
    signer: Arc<dyn UrlSigner>,
    settings: ToolbeltSettings,
}

impl ToolbeltController {
    /// Create a controller over the given collaborators.
    #[must_use]
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        signer: Arc<dyn UrlSigner>,
        settings: ToolbeltSettings,
    ) -> Self {
        Self {
            cluster,
            signer,
            settings,
        }
    }

    /// Issue a fresh signed link and persist it in the client's
    /// toolbelt secret.
    pub async fn create(&self, client_id: &str) -> ControlResult<Toolbelt> {
        check_client(&self.cluster, client_id).await?;

        let hours = self.settings.expiry_hours;
        let url = self
            .signer
            .signed_url(
                &self.settings.bucket,
                &self.settings.key,
                Duration::from_secs(hours * 60 * 60),
            )
            .await?;
        let toolbelt = Toolbelt {
            client_id: client_id.to_owned(),
            url,
            message: format!("url expires in {hours}hrs, time created: {}", Utc::now()),
        };

        // Re-creating replaces the previous bundle.
        let secret = toolbelt_secret(&toolbelt);
        if let Err(err) = self.cluster.create_secret(client_id, secret.clone()).await {
            if !err.is_already_exists() {
                return Err(err.into());
            }
            self.cluster.delete_secret(client_id, SECRET_NAME).await?;
            self.cluster.create_secret(client_id, secret).await?;
        }
        info!(client_id, "toolbelt created");
        Ok(toolbelt)
    }

    /// Read the stored toolbelt back from its secret.
    pub async fn get(&self, client_id: &str) -> ControlResult<Toolbelt> {
        check_client(&self.cluster, client_id).await?;
        let secret = self.cluster.get_secret(client_id, SECRET_NAME).await?;
        let field = |key: &str| {
            secret
                .data
                .get(key)
                .map(|v| String::from_utf8_lossy(v).into_owned())
                .unwrap_or_default()
        };
        Ok(Toolbelt {
            client_id: client_id.to_owned(),
            url: field("url"),
            message: field("message"),
        })
    }

    /// Delete the stored toolbelt.
    pub async fn delete(&self, client_id: &str) -> ControlResult<Toolbelt> {
        check_client(&self.cluster, client_id).await?;
        self.cluster.delete_secret(client_id, SECRET_NAME).await?;
        Ok(Toolbelt {
            client_id: client_id.to_owned(),
            message: "toolbelt deleted".to_owned(),
            ..Toolbelt::default()
        })
    }
}

fn toolbelt_secret(toolbelt: &Toolbelt) -> SecretResource {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_owned(), SECRET_NAME.to_owned());
    labels.insert("stack".to_owned(), "quarry".to_owned());
    let mut data = BTreeMap::new();
    data.insert("url".to_owned(), toolbelt.url.clone().into_bytes());
    data.insert("message".to_owned(), toolbelt.message.clone().into_bytes());
    SecretResource {
        metadata: Metadata::new(SECRET_NAME, &toolbelt.client_id).with_labels(labels),
        data,
    }
}
