//! The provisioning orchestrator.
//!
//! Expands a validated client request into a full stack and drives the
//! single-resource controllers through it in a fixed order. There is no
//! rollback: a failure surfaces to the caller and the partially created
//! stack stays in place for inspection.

use std::sync::Arc;

use quarry_cluster::{Certificate, ClusterClient, Metadata, Namespace};
use quarry_core::names::{certificate_name, tls_secret_name};
use quarry_core::types::{
    Artifactory, ArtifactoryConfig, ArtifactoryGroup, ArtifactoryHosted, ArtifactoryProxy, Ci,
    Client, CmsDeployment, CmsSpec, FullDeployment, RoleConfig, Scm, ScmConfig, ScmInitData,
    ScmOrganization, ScmRepository, Toolbelt,
};
use quarry_secrets::SecretStore;
use tracing::{info, warn};

use crate::config::ControlConfig;
use crate::controllers::{
    client_secret_path, ArtifactoryController, CiController, CmsController, ScmController,
};
use crate::error::{ControlError, ControlResult};
use crate::signer::UrlSigner;
use crate::toolbelt::ToolbeltController;

/// What a provisioning call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// A bare client: namespace and certificate only.
    Client(Client),
    /// A fully expanded stack. For dry runs this is the plan that would
    /// have been executed; nothing was created.
    FullDeployment(Box<FullDeployment>),
}

/// Coordinates controllers to provision complete per-client stacks.
pub struct Orchestrator {
    cluster: Arc<dyn ClusterClient>,
    secrets: Arc<dyn SecretStore>,
    config: ControlConfig,
    artifactory: ArtifactoryController,
    scm: ScmController,
    ci: CiController,
    cms: CmsController,
    toolbelt: ToolbeltController,
}

impl Orchestrator {
    /// Wire up an orchestrator and its controllers over shared
    /// collaborators.
    #[must_use]
    pub fn new(
        cluster: Arc<dyn ClusterClient>,
        secrets: Arc<dyn SecretStore>,
        signer: Arc<dyn UrlSigner>,
        config: ControlConfig,
    ) -> Self {
        let artifactory =
            ArtifactoryController::new(Arc::clone(&cluster), config.stack.clone());
        let scm = ScmController::new(
            Arc::clone(&cluster),
            Arc::clone(&signer),
            config.stack.clone(),
        );
        let ci = CiController::new(Arc::clone(&cluster), config.stack.clone());
        let cms = CmsController::new(Arc::clone(&cluster), Arc::clone(&secrets));
        let toolbelt = ToolbeltController::new(
            Arc::clone(&cluster),
            signer,
            config.toolbelt.clone(),
        );
        Self {
            cluster,
            secrets,
            config,
            artifactory,
            scm,
            ci,
            cms,
            toolbelt,
        }
    }

    /// The artifact-repository controller.
    #[must_use]
    pub fn artifactory(&self) -> &ArtifactoryController {
        &self.artifactory
    }

    /// The source-control controller.
    #[must_use]
    pub fn scm(&self) -> &ScmController {
        &self.scm
    }

    /// The continuous-integration controller.
    #[must_use]
    pub fn ci(&self) -> &CiController {
        &self.ci
    }

    /// The content-management deployment controller.
    #[must_use]
    pub fn cms(&self) -> &CmsController {
        &self.cms
    }

    /// The toolbelt controller.
    #[must_use]
    pub fn toolbelt(&self) -> &ToolbeltController {
        &self.toolbelt
    }

    fn validate(client: &Client) -> ControlResult<()> {
        if client.client_id.is_empty() {
            return Err(ControlError::validation("clientId is required"));
        }
        if client.dry_run && !client.custom_config {
            return Err(ControlError::validation(
                "dryRun only available with customConfig",
            ));
        }
        if !client.custom_config {
            return Ok(());
        }
        let Some(configuration) = &client.configuration else {
            return Err(ControlError::validation(
                "configuration not provided when the request requires customConfig",
            ));
        };
        if configuration.admin_email.is_empty() {
            return Err(ControlError::validation("adminEmail is required"));
        }
        if configuration.full_company_name.is_empty() {
            return Err(ControlError::validation("fullCompanyName is required"));
        }
        if configuration.environments.is_empty() {
            return Err(ControlError::validation(
                "environments are required, minimum 1",
            ));
        }
        if configuration.cms_instances_type.is_empty()
            || configuration.cms_instances_version.is_empty()
        {
            return Err(ControlError::validation(
                "aemInstancesVersion or aemInstancesType are empty",
            ));
        }
        if configuration.dispatcher_instances_type.is_empty()
            || configuration.dispatcher_instances_version.is_empty()
        {
            return Err(ControlError::validation(
                "dispatcherInstancesVersion or dispatcherInstancesType are empty",
            ));
        }
        Ok(())
    }

    /// Expand a validated client request into the full stack plan. Pure:
    /// identical requests expand to identical plans.
    #[must_use]
    pub fn expand(client: &Client) -> FullDeployment {
        // validate() guarantees the configuration is present.
        let configuration = client.configuration.clone().unwrap_or_default();
        let client_id = &client.client_id;

        let cms_deployments = configuration
            .environments
            .iter()
            .map(|environment| CmsDeployment {
                client_id: client_id.clone(),
                environment_id: environment.clone(),
                spec: CmsSpec {
                    authors: RoleConfig {
                        instance_type: configuration.cms_instances_type.clone(),
                        replicas: 1,
                    },
                    publishers: RoleConfig {
                        instance_type: configuration.cms_instances_type.clone(),
                        replicas: 1,
                    },
                    dispatchers: RoleConfig {
                        instance_type: configuration.dispatcher_instances_type.clone(),
                        replicas: 1,
                    },
                    version: configuration.cms_instances_version.clone(),
                    dispatcher_version: configuration.dispatcher_instances_version.clone(),
                },
                status: String::new(),
            })
            .collect();

        let hosted_releases = format!("{client_id}-releases");
        let hosted_snapshots = format!("{client_id}-snapshots");
        let group = format!("{client_id}-group");
        let proxy = "quarry-danta".to_owned();

        let artifactory = Artifactory {
            artifactory_id: "nexus".to_owned(),
            image: "quarry/nexus:3.8.0".to_owned(),
            custom_config: true,
            configuration: Some(ArtifactoryConfig {
                hosteds: vec![
                    ArtifactoryHosted {
                        name: hosted_releases.clone(),
                        version_policy: "RELEASE".to_owned(),
                        layout_policy: "STRICT".to_owned(),
                    },
                    ArtifactoryHosted {
                        name: hosted_snapshots.clone(),
                        version_policy: "SNAPSHOT".to_owned(),
                        layout_policy: "PERMISSIVE".to_owned(),
                    },
                ],
                proxies: vec![ArtifactoryProxy {
                    name: proxy.clone(),
                    version_policy: "RELEASE".to_owned(),
                    layout_policy: "STRICT".to_owned(),
                    remote_url: "http://repo.tikaltechnologies.io/repository/danta-group"
                        .to_owned(),
                    required_auth: false,
                    authentication: None,
                }],
                groups: vec![ArtifactoryGroup {
                    name: group,
                    members: vec![proxy, hosted_releases, hosted_snapshots],
                }],
                ..ArtifactoryConfig::default()
            }),
            ..Artifactory::default()
        };

        let scm = Scm {
            scm_id: "gogs".to_owned(),
            image: "quarry/gogs:0.11.34".to_owned(),
            custom_config: true,
            configuration: Some(ScmConfig {
                init_data: Some(ScmInitData {
                    admin_name: "quarry".to_owned(),
                    admin_email: configuration.admin_email.clone(),
                    admin_password: "quarrygt".to_owned(),
                    admin_confirm_password: "quarrygt".to_owned(),
                    ..ScmInitData::default()
                }),
                organizations: vec![ScmOrganization {
                    username: client_id.clone(),
                    full_name: configuration.full_company_name.clone(),
                    ..ScmOrganization::default()
                }],
                repositories: vec![ScmRepository {
                    name: format!("{client_id}-app"),
                    owner: client_id.clone(),
                    content_setup_type: configuration.initial_repository_type.clone(),
                    ..ScmRepository::default()
                }],
            }),
            ..Scm::default()
        };

        let ci = Ci {
            ci_id: "drone".to_owned(),
            image: "quarry/drone:0.8-alpine".to_owned(),
            second_image: "quarry/drone-agent:0.8".to_owned(),
            ..Ci::default()
        };

        FullDeployment {
            client: client.clone(),
            cms_deployments,
            artifactory,
            scm,
            ci,
            toolbelt: Toolbelt {
                client_id: client_id.clone(),
                ..Toolbelt::default()
            },
        }
    }

    fn certificate(&self, client_id: &str) -> Certificate {
        let domain = &self.config.stack.external_domain;
        Certificate {
            metadata: Metadata::new(certificate_name(client_id), client_id),
            secret_name: tls_secret_name(client_id),
            dns_names: vec![domain.clone(), format!("*.{domain}")],
            issuer: self.config.certificate.issuer.clone(),
            dns_provider: self.config.certificate.dns_provider.clone(),
        }
    }

    /// Provision a client.
    ///
    /// Validation runs to completion first; a dry run returns the
    /// expanded plan without a single collaborator call. Otherwise the
    /// namespace and certificate are created, then the stack in fixed
    /// order: deployments per environment, artifactory, scm, ci (wired
    /// to the scm host), and finally the toolbelt on a best-effort
    /// basis.
    pub async fn provision(&self, client: Client) -> ControlResult<ProvisionOutcome> {
        Self::validate(&client)?;

        if !client.dry_run {
            let mut labels = std::collections::BTreeMap::new();
            labels.insert("stack".to_owned(), "quarry".to_owned());
            self.cluster
                .create_namespace(Namespace {
                    name: client.client_id.clone(),
                    labels,
                    annotations: client.metadata.clone(),
                })
                .await?;
            self.cluster
                .create_certificate(self.certificate(&client.client_id))
                .await?;
        }

        if !client.custom_config {
            info!(client_id = %client.client_id, "client created");
            return Ok(ProvisionOutcome::Client(client));
        }

        let mut full = Self::expand(&client);
        if client.dry_run {
            return Ok(ProvisionOutcome::FullDeployment(Box::new(full)));
        }

        for deployment in &full.cms_deployments {
            self.cms.create(deployment).await?;
        }
        self.artifactory
            .create(&client.client_id, &mut full.artifactory)
            .await?;
        self.scm.create(&client.client_id, &mut full.scm).await?;
        full.ci.scm_url = full.scm.host.clone();
        self.ci.create(&client.client_id, &mut full.ci).await?;

        match self.toolbelt.create(&client.client_id).await {
            Ok(toolbelt) => full.toolbelt = toolbelt,
            Err(err) => warn!(client_id = %client.client_id, error = %err, "toolbelt not created"),
        }

        info!(client_id = %client.client_id, "full deployment created");
        Ok(ProvisionOutcome::FullDeployment(Box::new(full)))
    }

    /// List all clients, one per namespace.
    pub async fn list_clients(&self) -> ControlResult<Vec<Client>> {
        let namespaces = self.cluster.list_namespaces().await?;
        Ok(namespaces
            .into_iter()
            .map(|ns| Client {
                client_id: ns.name,
                metadata: ns.annotations,
                ..Client::default()
            })
            .collect())
    }

    /// Fetch a single client from its namespace.
    pub async fn get_client(&self, client_id: &str) -> ControlResult<Client> {
        let namespace = self.cluster.get_namespace(client_id).await?;
        Ok(Client {
            client_id: namespace.name,
            metadata: namespace.annotations,
            ..Client::default()
        })
    }

    /// Tear down a client: the namespace delete cascades to everything
    /// inside it, then stored credentials are cleaned up best effort.
    pub async fn deprovision(&self, client_id: &str) -> ControlResult<Client> {
        self.cluster.delete_namespace(client_id).await?;
        if let Err(err) = self.secrets.clean_up(&client_secret_path(client_id)).await {
            warn!(client_id, error = %err, "stored credentials not cleaned up");
        }
        info!(client_id, "client deleted");
        Ok(Client {
            client_id: client_id.to_owned(),
            ..Client::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::types::ClientConfiguration;

    fn configured_client() -> Client {
        Client {
            client_id: "acme".to_owned(),
            custom_config: true,
            configuration: Some(ClientConfiguration {
                full_company_name: "Acme Inc".to_owned(),
                admin_email: "admin@acme.co".to_owned(),
                environments: vec!["dev".to_owned(), "prod".to_owned()],
                cms_instances_version: "6.3".to_owned(),
                cms_instances_type: "small".to_owned(),
                dispatcher_instances_version: "4.2.2".to_owned(),
                dispatcher_instances_type: "small".to_owned(),
                initial_repository_type: String::new(),
            }),
            ..Client::default()
        }
    }

    #[test]
    fn expand_is_deterministic() {
        let client = configured_client();
        assert_eq!(Orchestrator::expand(&client), Orchestrator::expand(&client));
    }

    #[test]
    fn expand_derives_repository_names_from_the_client() {
        let full = Orchestrator::expand(&configured_client());

        assert_eq!(full.cms_deployments.len(), 2);
        assert_eq!(full.cms_deployments[0].environment_id, "dev");
        assert_eq!(full.cms_deployments[0].spec.authors.replicas, 1);
        assert_eq!(full.cms_deployments[0].spec.version, "6.3");

        let config = full.artifactory.configuration.unwrap();
        assert_eq!(config.hosteds[0].name, "acme-releases");
        assert_eq!(config.hosteds[0].version_policy, "RELEASE");
        assert_eq!(config.hosteds[1].name, "acme-snapshots");
        assert_eq!(config.hosteds[1].layout_policy, "PERMISSIVE");
        assert_eq!(config.groups[0].name, "acme-group");
        assert_eq!(config.groups[0].members.len(), 3);

        let scm_config = full.scm.configuration.unwrap();
        assert_eq!(scm_config.organizations[0].username, "acme");
        assert_eq!(scm_config.organizations[0].full_name, "Acme Inc");
        assert_eq!(scm_config.repositories[0].name, "acme-app");
        assert_eq!(scm_config.repositories[0].owner, "acme");

        assert_eq!(full.ci.ci_id, "drone");
        assert!(full.ci.scm_url.is_empty());
        assert_eq!(full.toolbelt.client_id, "acme");
    }
}
