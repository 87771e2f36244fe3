//! Source-control controller.

use std::sync::Arc;
use std::time::Duration;

use quarry_cluster::ClusterClient;
use quarry_core::catalog::{self, VendorCategory};
use quarry_core::commerce;
use quarry_core::names::VendorNames;
use quarry_core::stack::{gogs, StackSettings};
use quarry_core::types::{
    Scm, Vendor, CONTENT_SETUP_BLOOMREACH, CONTENT_SETUP_EP_COMMERCE,
};
use tracing::{info, warn};

use crate::controllers::check_client;
use crate::error::{ControlError, ControlResult};
use crate::signer::UrlSigner;

const PACKAGE_URL_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// Provisions and tears down source-control servers.
pub struct ScmController {
    cluster: Arc<dyn ClusterClient>,
    signer: Arc<dyn UrlSigner>,
    settings: StackSettings,
}

impl ScmController {
    /// Create a controller over the given collaborators.
    #[must_use]
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        signer: Arc<dyn UrlSigner>,
        settings: StackSettings,
    ) -> Self {
        Self {
            cluster,
            signer,
            settings,
        }
    }

    /// The vendors this controller can provision.
    #[must_use]
    pub fn vendors(&self) -> Vec<Vendor> {
        catalog::vendors_for(VendorCategory::Scm)
    }

    fn validate(scm: &Scm) -> ControlResult<()> {
        if scm.image.is_empty() {
            return Err(ControlError::validation("image is required"));
        }
        if !catalog::is_valid_vendor(VendorCategory::Scm, &scm.scm_id) {
            return Err(ControlError::validation("unknown scmId"));
        }
        if !scm.custom_config {
            if scm.configuration.is_some() {
                return Err(ControlError::validation(
                    "configuration provided when the request does not require customConfig",
                ));
            }
            return Ok(());
        }
        let Some(configuration) = &scm.configuration else {
            return Err(ControlError::validation(
                "configuration not provided when the request requires customConfig",
            ));
        };
        let Some(init_data) = &configuration.init_data else {
            return Err(ControlError::validation(
                "init_data not provided when the request requires customConfig",
            ));
        };
        if init_data.admin_email.is_empty()
            || init_data.admin_confirm_password.is_empty()
            || init_data.admin_name.is_empty()
            || init_data.admin_password.is_empty()
        {
            return Err(ControlError::validation(
                "admin account setting is invalid: one or more empty values",
            ));
        }
        if init_data.admin_name == "admin" {
            return Err(ControlError::validation(
                "admin account setting is invalid: admin name is reserved",
            ));
        }
        for repo in &configuration.repositories {
            if repo.content_setup_type == CONTENT_SETUP_EP_COMMERCE {
                let Some(project) = &repo.ep_commerce else {
                    return Err(ControlError::validation(
                        "ep_commerce not provided when the content_setup_type is set to ep-commerce",
                    ));
                };
                commerce::find_init_package(&project.version)
                    .map_err(|e| ControlError::validation(e.to_string()))?;
            }
            if repo.content_setup_type == CONTENT_SETUP_BLOOMREACH {
                let Some(archetype) = &repo.bloomreach_archetype else {
                    return Err(ControlError::validation(
                        "bloomreach_archetype not provided when the content_setup_type is set to bloomreach-archetype",
                    ));
                };
                if archetype.archetype_version.is_empty()
                    || archetype.artifact_id.is_empty()
                    || archetype.group_id.is_empty()
                    || archetype.package.is_empty()
                    || archetype.project_name.is_empty()
                    || archetype.version.is_empty()
                {
                    return Err(ControlError::validation(
                        "required fields for bloomreach_archetype: archetype_version, group_id, artifact_id, version, package, project_name",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Resolve commerce seed projects: pin the platform version, default
    /// the extension version and issue a signed download link.
    async fn resolve_seed_projects(&self, scm: &mut Scm) -> ControlResult<()> {
        let Some(configuration) = &mut scm.configuration else {
            return Ok(());
        };
        for repo in &mut configuration.repositories {
            if repo.content_setup_type != CONTENT_SETUP_EP_COMMERCE {
                continue;
            }
            let Some(project) = &mut repo.ep_commerce else {
                continue;
            };
            let package = commerce::find_init_package(&project.version)
                .map_err(|e| ControlError::validation(e.to_string()))?;
            if project.extension_version.is_empty() {
                project.extension_version = commerce::DEFAULT_EXTENSION_VERSION.to_owned();
            }
            project.platform_version = package.platform_version;
            project.source_code_url = self
                .signer
                .signed_url(&package.bucket, &package.key, PACKAGE_URL_EXPIRY)
                .await?;
        }
        Ok(())
    }

    /// Provision a source-control server, populating `scm` with the
    /// created resource names, external host and generated defaults.
    pub async fn create(&self, client_id: &str, scm: &mut Scm) -> ControlResult<()> {
        Self::validate(scm)?;
        check_client(&self.cluster, client_id).await?;
        if scm.custom_config {
            self.resolve_seed_projects(scm).await?;
        }

        let service = self
            .cluster
            .create_service(client_id, gogs::service(client_id))
            .await?;
        let route = self
            .cluster
            .create_route(client_id, gogs::route(&self.settings, client_id))
            .await?;
        let workload = self
            .cluster
            .create_workload(
                client_id,
                gogs::workload(&self.settings, client_id, &scm.image),
            )
            .await?;

        let domain = route.external_host().unwrap_or_default().to_owned();
        scm.host = format!("https://{domain}");
        scm.server_name = workload.metadata.name;
        scm.service_name = service.metadata.name;
        scm.route_name = route.metadata.name;

        if scm.custom_config {
            // Safe: validate() confirmed configuration and init_data exist.
            if let Some(configuration) = &mut scm.configuration {
                if let Some(init_data) = &mut configuration.init_data {
                    init_data.domain = domain;
                    init_data.app_url = scm.host.clone();
                    init_data.http_port = gogs::PORT.to_string();
                    init_data.repo_root_path = "/data/git/gogs-repositories".to_owned();
                    init_data.log_root_path = "/app/gogs/log".to_owned();
                }
            }
            let payload = serde_json::to_vec(&scm.configuration)?;
            self.cluster
                .create_secret(client_id, gogs::secret(client_id, payload))
                .await?;
            self.cluster
                .create_job(client_id, gogs::init_job(&self.settings, client_id, &scm.host))
                .await?;
        }

        info!(client_id, host = %scm.host, "scm created");
        Ok(())
    }

    /// Read a source-control server back from its live resources.
    pub async fn get(&self, client_id: &str, scm_id: &str) -> ControlResult<Scm> {
        check_client(&self.cluster, client_id).await?;
        if !catalog::is_valid_vendor(VendorCategory::Scm, scm_id) {
            return Err(ControlError::validation("unknown scmId"));
        }

        let names = VendorNames::new(scm_id);
        let workload = self.cluster.get_workload(client_id, &names.workload).await?;
        let service = self.cluster.get_service(client_id, &names.service).await?;
        let route = self.cluster.get_route(client_id, &names.route).await?;

        let host = route
            .external_host()
            .map(|host| format!("https://{host}"))
            .unwrap_or_default();
        Ok(Scm {
            scm_id: scm_id.to_owned(),
            server_name: workload.metadata.name,
            service_name: service.metadata.name,
            route_name: route.metadata.name,
            host,
            ..Scm::default()
        })
    }

    /// Updates are not offered.
    pub fn update(&self) -> ControlResult<Scm> {
        Err(ControlError::NotSupported)
    }

    /// Tear down a source-control server. The init job and secret may
    /// not exist; their removal is best effort.
    pub async fn delete(&self, client_id: &str, scm_id: &str) -> ControlResult<()> {
        check_client(&self.cluster, client_id).await?;
        let names = VendorNames::new(scm_id);

        self.cluster.delete_workload(client_id, &names.workload).await?;
        self.cluster.delete_service(client_id, &names.service).await?;
        self.cluster.delete_route(client_id, &names.route).await?;

        if let Err(err) = self.cluster.delete_job(client_id, &names.init_job).await {
            warn!(client_id, error = %err, "job not deleted");
        }
        if let Err(err) = self.cluster.delete_secret(client_id, &names.init_secret).await {
            warn!(client_id, error = %err, "secret not deleted");
        }
        info!(client_id, scm_id, "scm deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_cluster::{MemoryCluster, Namespace};
    use quarry_core::types::{EpProject, ScmConfig, ScmInitData, ScmRepository};

    use crate::signer::StaticSigner;

    fn init_data() -> ScmInitData {
        ScmInitData {
            admin_name: "quarry".to_owned(),
            admin_password: "quarrygt".to_owned(),
            admin_confirm_password: "quarrygt".to_owned(),
            admin_email: "admin@acme.co".to_owned(),
            ..ScmInitData::default()
        }
    }

    fn scm_with(configuration: ScmConfig) -> Scm {
        Scm {
            scm_id: "gogs".to_owned(),
            image: "quarry/gogs:0.11.34".to_owned(),
            custom_config: true,
            configuration: Some(configuration),
            ..Scm::default()
        }
    }

    async fn seeded() -> (Arc<MemoryCluster>, Arc<StaticSigner>, ScmController) {
        let cluster = Arc::new(MemoryCluster::new());
        cluster
            .create_namespace(Namespace {
                name: "acme".to_owned(),
                labels: Default::default(),
                annotations: Default::default(),
            })
            .await
            .unwrap();
        let signer = Arc::new(StaticSigner::new());
        let controller = ScmController::new(
            Arc::clone(&cluster) as Arc<dyn ClusterClient>,
            Arc::clone(&signer) as Arc<dyn UrlSigner>,
            StackSettings::default(),
        );
        (cluster, signer, controller)
    }

    #[tokio::test]
    async fn reserved_admin_name_is_rejected() {
        let (cluster, _, controller) = seeded().await;
        let before = cluster.operation_count();
        let mut scm = scm_with(ScmConfig {
            init_data: Some(ScmInitData {
                admin_name: "admin".to_owned(),
                ..init_data()
            }),
            ..ScmConfig::default()
        });
        let err = controller.create("acme", &mut scm).await.unwrap_err();
        assert!(err.to_string().contains("admin name is reserved"));
        assert_eq!(cluster.operation_count(), before);
    }

    #[tokio::test]
    async fn configuration_without_custom_config_is_rejected() {
        let (cluster, signer, controller) = seeded().await;
        let before = cluster.operation_count();
        let mut scm = Scm {
            custom_config: false,
            ..scm_with(ScmConfig {
                init_data: Some(init_data()),
                ..ScmConfig::default()
            })
        };
        let err = controller.create("acme", &mut scm).await.unwrap_err();
        assert!(err.to_string().contains("does not require customConfig"));
        assert_eq!(signer.call_count(), 0);
        assert_eq!(cluster.operation_count(), before);
    }

    #[tokio::test]
    async fn create_fills_init_defaults() {
        let (cluster, _, controller) = seeded().await;
        let mut scm = scm_with(ScmConfig {
            init_data: Some(init_data()),
            ..ScmConfig::default()
        });
        controller.create("acme", &mut scm).await.unwrap();

        assert_eq!(scm.host, "https://gogs-server-acme.quarry.local");
        let init = scm.configuration.unwrap().init_data.unwrap();
        assert_eq!(init.domain, "gogs-server-acme.quarry.local");
        assert_eq!(init.app_url, "https://gogs-server-acme.quarry.local");
        assert_eq!(init.http_port, "3000");
        assert_eq!(init.repo_root_path, "/data/git/gogs-repositories");
        assert_eq!(init.log_root_path, "/app/gogs/log");

        cluster.get_secret("acme", "gogs-init-config").await.unwrap();
    }

    #[tokio::test]
    async fn get_reads_names_and_host_back() {
        let (_, _, controller) = seeded().await;
        let mut scm = Scm {
            scm_id: "gogs".to_owned(),
            image: "quarry/gogs:0.11.34".to_owned(),
            ..Scm::default()
        };
        controller.create("acme", &mut scm).await.unwrap();

        let fetched = controller.get("acme", "gogs").await.unwrap();
        assert_eq!(fetched.server_name, "gogs-server");
        assert_eq!(fetched.service_name, "gogs-srvc");
        assert_eq!(fetched.route_name, "gogs-ingress");
        assert_eq!(fetched.host, "https://gogs-server-acme.quarry.local");
    }

    #[tokio::test]
    async fn commerce_repository_gets_a_signed_package_link() {
        let (_, signer, controller) = seeded().await;
        let mut scm = scm_with(ScmConfig {
            init_data: Some(init_data()),
            repositories: vec![ScmRepository {
                name: "acme-app".to_owned(),
                owner: "acme".to_owned(),
                content_setup_type: CONTENT_SETUP_EP_COMMERCE.to_owned(),
                ep_commerce: Some(EpProject {
                    version: "7.1".to_owned(),
                    ..EpProject::default()
                }),
                ..ScmRepository::default()
            }],
            ..ScmConfig::default()
        });
        controller.create("acme", &mut scm).await.unwrap();

        let repo = &scm.configuration.unwrap().repositories[0];
        let project = repo.ep_commerce.as_ref().unwrap();
        assert_eq!(project.platform_version, "701.0.0-SNAPSHOT");
        assert_eq!(project.extension_version, "0.0.0-SNAPSHOT");
        assert!(project.source_code_url.contains("quarry-ep-packages"));
        assert_eq!(signer.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_commerce_version_is_rejected_without_signing() {
        let (cluster, signer, controller) = seeded().await;
        let before = cluster.operation_count();
        let mut scm = scm_with(ScmConfig {
            init_data: Some(init_data()),
            repositories: vec![ScmRepository {
                name: "acme-app".to_owned(),
                owner: "acme".to_owned(),
                content_setup_type: CONTENT_SETUP_EP_COMMERCE.to_owned(),
                ep_commerce: Some(EpProject {
                    version: "9.9".to_owned(),
                    ..EpProject::default()
                }),
                ..ScmRepository::default()
            }],
            ..ScmConfig::default()
        });
        let err = controller.create("acme", &mut scm).await.unwrap_err();
        assert!(err.to_string().contains("not found init package"));
        assert_eq!(signer.call_count(), 0);
        assert_eq!(cluster.operation_count(), before);
    }
}
