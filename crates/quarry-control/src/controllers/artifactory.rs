//! Artifact-repository controller.

use std::sync::Arc;

use quarry_cluster::ClusterClient;
use quarry_core::catalog::{self, VendorCategory};
use quarry_core::names::VendorNames;
use quarry_core::stack::{nexus, StackSettings};
use quarry_core::types::{Artifactory, Vendor};
use tracing::{info, warn};

use crate::controllers::check_client;
use crate::error::{ControlError, ControlResult};

/// Provisions and tears down artifact repositories.
pub struct ArtifactoryController {
    cluster: Arc<dyn ClusterClient>,
    settings: StackSettings,
}

impl ArtifactoryController {
    /// Create a controller over the given cluster client.
    #[must_use]
    pub fn new(cluster: Arc<dyn ClusterClient>, settings: StackSettings) -> Self {
        Self { cluster, settings }
    }

    /// The vendors this controller can provision.
    #[must_use]
    pub fn vendors(&self) -> Vec<Vendor> {
        catalog::vendors_for(VendorCategory::Artifactory)
    }

    fn validate(artifactory: &Artifactory) -> ControlResult<()> {
        if artifactory.image.is_empty() {
            return Err(ControlError::validation("image is required"));
        }
        if !catalog::is_valid_vendor(VendorCategory::Artifactory, &artifactory.artifactory_id) {
            return Err(ControlError::validation("unknown artifactoryId"));
        }
        if artifactory.custom_config {
            let Some(configuration) = &artifactory.configuration else {
                return Err(ControlError::validation(
                    "configuration not provided when the request requires customConfig",
                ));
            };
            if configuration.operation_count() == 0 {
                return Err(ControlError::validation(
                    "requires at least 1 member of users, groups, hosteds or proxies",
                ));
            }
        } else if artifactory.configuration.is_some() {
            return Err(ControlError::validation(
                "configuration provided when the request does not require customConfig",
            ));
        }
        Ok(())
    }

    /// Provision an artifact repository, populating `artifactory` with
    /// the created resource names and external host.
    pub async fn create(
        &self,
        client_id: &str,
        artifactory: &mut Artifactory,
    ) -> ControlResult<()> {
        Self::validate(artifactory)?;
        check_client(&self.cluster, client_id).await?;

        let service = self
            .cluster
            .create_service(client_id, nexus::service(client_id))
            .await?;
        let route = self
            .cluster
            .create_route(client_id, nexus::route(&self.settings, client_id))
            .await?;
        let workload = self
            .cluster
            .create_workload(
                client_id,
                nexus::workload(&self.settings, client_id, &artifactory.image),
            )
            .await?;

        if let Some(host) = route.external_host() {
            artifactory.host = format!("https://{host}");
        }
        artifactory.server_name = workload.metadata.name;
        artifactory.service_name = service.metadata.name;
        artifactory.route_name = route.metadata.name;

        if artifactory.custom_config {
            let payload = serde_json::to_vec(&artifactory.configuration)?;
            self.cluster
                .create_secret(client_id, nexus::secret(client_id, payload))
                .await?;
            self.cluster
                .create_job(
                    client_id,
                    nexus::init_job(&self.settings, client_id, &artifactory.host),
                )
                .await?;
        }

        info!(client_id, host = %artifactory.host, "artifactory created");
        Ok(())
    }

    /// Read an artifact repository back from its live resources.
    pub async fn get(&self, client_id: &str, artifactory_id: &str) -> ControlResult<Artifactory> {
        check_client(&self.cluster, client_id).await?;
        if !catalog::is_valid_vendor(VendorCategory::Artifactory, artifactory_id) {
            return Err(ControlError::validation("unknown artifactoryId"));
        }

        let names = VendorNames::new(artifactory_id);
        let workload = self.cluster.get_workload(client_id, &names.workload).await?;
        let service = self.cluster.get_service(client_id, &names.service).await?;
        let route = self.cluster.get_route(client_id, &names.route).await?;

        let host = route
            .external_host()
            .map(|host| format!("https://{host}"))
            .unwrap_or_default();
        Ok(Artifactory {
            artifactory_id: artifactory_id.to_owned(),
            server_name: workload.metadata.name,
            service_name: service.metadata.name,
            route_name: route.metadata.name,
            host,
            ..Artifactory::default()
        })
    }

    /// Updates are not offered; repositories are replaced, not mutated.
    pub fn update(&self) -> ControlResult<Artifactory> {
        Err(ControlError::NotSupported)
    }

    /// Tear down an artifact repository. The init job and secret may
    /// not exist; their removal is best effort.
    pub async fn delete(&self, client_id: &str, artifactory_id: &str) -> ControlResult<()> {
        check_client(&self.cluster, client_id).await?;
        let names = VendorNames::new(artifactory_id);

        self.cluster.delete_workload(client_id, &names.workload).await?;
        self.cluster.delete_service(client_id, &names.service).await?;
        self.cluster.delete_route(client_id, &names.route).await?;

        if let Err(err) = self.cluster.delete_job(client_id, &names.init_job).await {
            warn!(client_id, error = %err, "job not deleted");
        }
        if let Err(err) = self.cluster.delete_secret(client_id, &names.init_secret).await {
            warn!(client_id, error = %err, "secret not deleted");
        }
        info!(client_id, artifactory_id, "artifactory deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_cluster::MemoryCluster;
    use quarry_cluster::Namespace;
    use quarry_core::types::{ArtifactoryConfig, ArtifactoryHosted};

    fn controller(cluster: Arc<MemoryCluster>) -> ArtifactoryController {
        ArtifactoryController::new(cluster, StackSettings::default())
    }

    async fn seed_client(cluster: &MemoryCluster, client_id: &str) {
        cluster
            .create_namespace(Namespace {
                name: client_id.to_owned(),
                labels: Default::default(),
                annotations: Default::default(),
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_image_is_rejected_before_any_call() {
        let cluster = Arc::new(MemoryCluster::new());
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            ..Artifactory::default()
        };
        let err = controller.create("acme", &mut artifactory).await.unwrap_err();
        assert_eq!(err.to_string(), "image is required");
        assert_eq!(cluster.operation_count(), 0);
    }

    #[tokio::test]
    async fn custom_config_requires_at_least_one_operation() {
        let cluster = Arc::new(MemoryCluster::new());
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            custom_config: true,
            configuration: Some(ArtifactoryConfig::default()),
            ..Artifactory::default()
        };
        let err = controller.create("acme", &mut artifactory).await.unwrap_err();
        assert!(err.to_string().contains("at least 1 member"));
        assert_eq!(cluster.operation_count(), 0);
    }

    #[tokio::test]
    async fn configuration_without_custom_config_is_rejected() {
        let cluster = Arc::new(MemoryCluster::new());
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            custom_config: false,
            configuration: Some(ArtifactoryConfig {
                hosteds: vec![ArtifactoryHosted {
                    name: "acme-releases".to_owned(),
                    version_policy: "RELEASE".to_owned(),
                    layout_policy: "STRICT".to_owned(),
                }],
                ..ArtifactoryConfig::default()
            }),
            ..Artifactory::default()
        };
        let err = controller.create("acme", &mut artifactory).await.unwrap_err();
        assert!(err.to_string().contains("does not require customConfig"));
        assert_eq!(cluster.operation_count(), 0);
    }

    #[tokio::test]
    async fn create_populates_names_and_host() {
        let cluster = Arc::new(MemoryCluster::new());
        seed_client(&cluster, "acme").await;
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            custom_config: true,
            configuration: Some(ArtifactoryConfig {
                hosteds: vec![ArtifactoryHosted {
                    name: "acme-releases".to_owned(),
                    version_policy: "RELEASE".to_owned(),
                    layout_policy: "STRICT".to_owned(),
                }],
                ..ArtifactoryConfig::default()
            }),
            ..Artifactory::default()
        };
        controller.create("acme", &mut artifactory).await.unwrap();
        assert_eq!(artifactory.server_name, "nexus-server");
        assert_eq!(artifactory.service_name, "nexus-srvc");
        assert_eq!(artifactory.route_name, "nexus-ingress");
        assert_eq!(artifactory.host, "https://nexus-server-acme.quarry.local");

        // init secret and job were created alongside
        cluster.get_secret("acme", "nexus-init-config").await.unwrap();
    }

    #[tokio::test]
    async fn get_reads_names_and_host_back() {
        let cluster = Arc::new(MemoryCluster::new());
        seed_client(&cluster, "acme").await;
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            ..Artifactory::default()
        };
        controller.create("acme", &mut artifactory).await.unwrap();

        let fetched = controller.get("acme", "nexus").await.unwrap();
        assert_eq!(fetched.server_name, "nexus-server");
        assert_eq!(fetched.service_name, "nexus-srvc");
        assert_eq!(fetched.route_name, "nexus-ingress");
        assert_eq!(fetched.host, "https://nexus-server-acme.quarry.local");
    }

    #[tokio::test]
    async fn create_twice_reports_already_exists() {
        let cluster = Arc::new(MemoryCluster::new());
        seed_client(&cluster, "acme").await;
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            ..Artifactory::default()
        };
        controller.create("acme", &mut artifactory.clone()).await.unwrap();
        let err = controller.create("acme", &mut artifactory).await.unwrap_err();
        match err {
            ControlError::Cluster(e) => assert!(e.is_already_exists()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn delete_swallows_missing_job_and_secret() {
        let cluster = Arc::new(MemoryCluster::new());
        seed_client(&cluster, "acme").await;
        let controller = controller(Arc::clone(&cluster));
        let mut artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            ..Artifactory::default()
        };
        controller.create("acme", &mut artifactory).await.unwrap();
        controller.delete("acme", "nexus").await.unwrap();
        assert!(cluster.get_workload("acme", "nexus-server").await.is_err());
    }
}
