//! Content-management deployment controller.
//!
//! Deployments are declarative custom resources reconciled by an
//! operator in the cluster; this controller manages the declarative
//! form and derives per-instance status from the resulting pods.

use std::collections::BTreeMap;
use std::sync::Arc;

use quarry_cluster::{
    ClusterClient, CmsDeploymentResource, CmsDeploymentSpec, Metadata, RoleSpec,
};
use quarry_core::types::{
    CmsDeployment, CmsSpec, DispatcherConfig, EnvironmentSummary, InstanceStatus, RoleConfig,
};
use quarry_secrets::SecretStore;
use tracing::info;

use crate::controllers::check_client;
use crate::error::{ControlError, ControlResult};

/// Path under which a pod's generated credential is stored.
fn pod_secret_path(namespace: &str, environment: &str, pod: &str) -> String {
    format!("secret/{namespace}/{environment}/{pod}")
}

/// Base secret path for everything belonging to one client.
pub(crate) fn client_secret_path(namespace: &str) -> String {
    format!("secret/{namespace}")
}

fn to_resource(deployment: &CmsDeployment) -> CmsDeploymentResource {
    let spec = &deployment.spec;
    CmsDeploymentResource {
        metadata: Metadata::new(&deployment.environment_id, &deployment.client_id),
        spec: CmsDeploymentSpec {
            authors: role_spec(&spec.authors),
            publishers: role_spec(&spec.publishers),
            dispatchers: role_spec(&spec.dispatchers),
            version: spec.version.clone(),
            dispatcher_version: spec.dispatcher_version.clone(),
        },
        status: Default::default(),
    }
}

fn role_spec(role: &RoleConfig) -> RoleSpec {
    RoleSpec {
        instance_type: role.instance_type.clone(),
        replicas: role.replicas,
    }
}

fn role_config(role: &RoleSpec) -> RoleConfig {
    RoleConfig {
        instance_type: role.instance_type.clone(),
        replicas: role.replicas,
    }
}

/// Manages content-management deployments, one per environment.
pub struct CmsController {
    cluster: Arc<dyn ClusterClient>,
    secrets: Arc<dyn SecretStore>,
}

impl CmsController {
    /// Create a controller over the given collaborators.
    #[must_use]
    pub fn new(cluster: Arc<dyn ClusterClient>, secrets: Arc<dyn SecretStore>) -> Self {
        Self { cluster, secrets }
    }

    fn validate(deployment: &CmsDeployment) -> ControlResult<()> {
        if deployment.spec.dispatcher_version.is_empty() || deployment.spec.version.is_empty() {
            return Err(ControlError::validation(
                "dispatcher_version and version are required",
            ));
        }
        Ok(())
    }

    /// Create a deployment for one environment.
    pub async fn create(&self, deployment: &CmsDeployment) -> ControlResult<()> {
        Self::validate(deployment)?;
        check_client(&self.cluster, &deployment.client_id).await?;
        self.cluster
            .create_cms_deployment(&deployment.client_id, to_resource(deployment))
            .await?;
        info!(
            client_id = %deployment.client_id,
            environment_id = %deployment.environment_id,
            "cms deployment created"
        );
        Ok(())
    }

    /// Read the deployment for one environment, spec and phase.
    pub async fn get(&self, client_id: &str, environment_id: &str) -> ControlResult<CmsDeployment> {
        check_client(&self.cluster, client_id).await?;
        let resource = self
            .cluster
            .get_cms_deployment(client_id, environment_id)
            .await?;
        Ok(CmsDeployment {
            client_id: client_id.to_owned(),
            environment_id: environment_id.to_owned(),
            spec: CmsSpec {
                authors: role_config(&resource.spec.authors),
                publishers: role_config(&resource.spec.publishers),
                dispatchers: role_config(&resource.spec.dispatchers),
                version: resource.spec.version,
                dispatcher_version: resource.spec.dispatcher_version,
            },
            status: resource.status.phase,
        })
    }

    /// Replace the deployment spec for one environment.
    pub async fn update(&self, deployment: &CmsDeployment) -> ControlResult<()> {
        check_client(&self.cluster, &deployment.client_id).await?;
        Self::validate(deployment)?;
        self.cluster
            .update_cms_deployment(&deployment.client_id, to_resource(deployment))
            .await?;
        Ok(())
    }

    /// Delete the deployment for one environment.
    pub async fn delete(&self, client_id: &str, environment_id: &str) -> ControlResult<()> {
        check_client(&self.cluster, client_id).await?;
        self.cluster
            .delete_cms_deployment(client_id, environment_id)
            .await?;
        info!(client_id, environment_id, "cms deployment deleted");
        Ok(())
    }

    /// List a client's environments, one per deployment.
    pub async fn list_environments(
        &self,
        client_id: &str,
    ) -> ControlResult<Vec<EnvironmentSummary>> {
        check_client(&self.cluster, client_id).await?;
        let deployments = self.cluster.list_cms_deployments(client_id).await?;
        Ok(deployments
            .into_iter()
            .map(|d| EnvironmentSummary {
                environment_id: d.metadata.name,
            })
            .collect())
    }

    /// List the member instances of one environment with derived health
    /// flags and the generated credential for each.
    pub async fn list_instances(
        &self,
        client_id: &str,
        environment_id: &str,
    ) -> ControlResult<Vec<InstanceStatus>> {
        let mut selector = BTreeMap::new();
        selector.insert("app".to_owned(), "cms".to_owned());
        selector.insert("deployment".to_owned(), environment_id.to_owned());
        let pods = self.cluster.list_pods(client_id, &selector).await?;

        let mut instances = Vec::with_capacity(pods.len());
        for pod in pods {
            let path = pod_secret_path(client_id, environment_id, &pod.metadata.name);
            let secret = self.secrets.get(&path).await?;
            let password = secret.get("password").cloned().unwrap_or_default();
            instances.push(InstanceStatus {
                name: pod.metadata.name.clone(),
                account: pod.metadata.namespace.clone(),
                environment: environment_id.to_owned(),
                runmode: pod.metadata.labels.get("runmode").cloned().unwrap_or_default(),
                running: pod.is_running(),
                ready: pod.is_ready(),
                password,
            });
        }
        Ok(instances)
    }

    /// Read an environment's dispatcher configuration from its config map.
    pub async fn dispatcher_config(
        &self,
        client_id: &str,
        environment_id: &str,
    ) -> ControlResult<DispatcherConfig> {
        check_client(&self.cluster, client_id).await?;
        let config_map = self
            .cluster
            .get_config_map(client_id, &format!("{environment_id}-dispatcher"))
            .await?;
        Ok(DispatcherConfig {
            client_id: client_id.to_owned(),
            environment_id: environment_id.to_owned(),
            name: config_map.metadata.name,
            data: config_map.data,
        })
    }

    /// Replace an environment's dispatcher configuration.
    pub async fn update_dispatcher_config(
        &self,
        client_id: &str,
        environment_id: &str,
        config: &DispatcherConfig,
    ) -> ControlResult<DispatcherConfig> {
        check_client(&self.cluster, client_id).await?;
        if config.name.is_empty() {
            return Err(ControlError::validation("name is required"));
        }
        let updated = self
            .cluster
            .update_config_map(client_id, &config.name, config.data.clone())
            .await?;
        Ok(DispatcherConfig {
            client_id: client_id.to_owned(),
            environment_id: environment_id.to_owned(),
            name: updated.metadata.name,
            data: updated.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_cluster::{
        MemoryCluster, Namespace, Pod, PodCondition, PodPhase, PodStatus,
    };
    use quarry_secrets::MemorySecrets;

    fn deployment() -> CmsDeployment {
        CmsDeployment {
            client_id: "acme".to_owned(),
            environment_id: "dev".to_owned(),
            spec: CmsSpec {
                authors: RoleConfig {
                    instance_type: "small".to_owned(),
                    replicas: 1,
                },
                publishers: RoleConfig {
                    instance_type: "small".to_owned(),
                    replicas: 1,
                },
                dispatchers: RoleConfig {
                    instance_type: "small".to_owned(),
                    replicas: 1,
                },
                version: "6.3".to_owned(),
                dispatcher_version: "4.2.2".to_owned(),
            },
            status: String::new(),
        }
    }

    async fn seeded() -> (Arc<MemoryCluster>, Arc<MemorySecrets>, CmsController) {
        let cluster = Arc::new(MemoryCluster::new());
        cluster
            .create_namespace(Namespace {
                name: "acme".to_owned(),
                labels: Default::default(),
                annotations: Default::default(),
            })
            .await
            .unwrap();
        let secrets = Arc::new(MemorySecrets::new());
        let controller = CmsController::new(
            Arc::clone(&cluster) as Arc<dyn ClusterClient>,
            Arc::clone(&secrets) as Arc<dyn SecretStore>,
        );
        (cluster, secrets, controller)
    }

    #[tokio::test]
    async fn missing_versions_are_rejected_before_any_call() {
        let (cluster, _, controller) = seeded().await;
        let before = cluster.operation_count();
        let mut invalid = deployment();
        invalid.spec.version.clear();
        let err = controller.create(&invalid).await.unwrap_err();
        assert_eq!(err.to_string(), "dispatcher_version and version are required");
        assert_eq!(cluster.operation_count(), before);
    }

    #[tokio::test]
    async fn round_trips_through_the_custom_resource() {
        let (_, _, controller) = seeded().await;
        controller.create(&deployment()).await.unwrap();
        let fetched = controller.get("acme", "dev").await.unwrap();
        assert_eq!(fetched.spec, deployment().spec);

        let environments = controller.list_environments("acme").await.unwrap();
        assert_eq!(environments.len(), 1);
        assert_eq!(environments[0].environment_id, "dev");
    }

    #[tokio::test]
    async fn instances_carry_passwords_from_the_secret_store() {
        let (cluster, secrets, controller) = seeded().await;
        let mut labels = BTreeMap::new();
        labels.insert("app".to_owned(), "cms".to_owned());
        labels.insert("deployment".to_owned(), "dev".to_owned());
        labels.insert("runmode".to_owned(), "author".to_owned());
        cluster.insert_pod(
            "acme",
            Pod {
                metadata: Metadata::new("author-0", "acme").with_labels(labels),
                status: PodStatus {
                    phase: PodPhase::Running,
                    conditions: vec![PodCondition {
                        condition_type: "Ready".to_owned(),
                        status: true,
                    }],
                },
            },
        )
        .unwrap();
        let mut value = quarry_secrets::SecretMap::new();
        value.insert("password".to_owned(), "s3cret".to_owned());
        secrets
            .put("secret/acme/dev/author-0", value)
            .await
            .unwrap();

        let instances = controller.list_instances("acme", "dev").await.unwrap();
        assert_eq!(instances.len(), 1);
        let instance = &instances[0];
        assert_eq!(instance.runmode, "author");
        assert!(instance.running);
        assert!(instance.ready);
        assert_eq!(instance.password, "s3cret");
    }

    #[tokio::test]
    async fn instance_password_defaults_to_empty_when_unstored() {
        let (cluster, _, controller) = seeded().await;
        let mut labels = BTreeMap::new();
        labels.insert("app".to_owned(), "cms".to_owned());
        labels.insert("deployment".to_owned(), "dev".to_owned());
        cluster.insert_pod(
            "acme",
            Pod {
                metadata: Metadata::new("publish-0", "acme").with_labels(labels),
                status: PodStatus {
                    phase: PodPhase::Pending,
                    conditions: vec![],
                },
            },
        )
        .unwrap();
        let instances = controller.list_instances("acme", "dev").await.unwrap();
        assert_eq!(instances[0].password, "");
        assert!(!instances[0].running);
    }

    #[tokio::test]
    async fn dispatcher_config_updates_require_a_name() {
        let (cluster, _, controller) = seeded().await;
        cluster
            .create_config_map(
                "acme",
                quarry_cluster::ConfigMapResource {
                    metadata: Metadata::new("dev-dispatcher", "acme"),
                    data: BTreeMap::new(),
                },
            )
            .await
            .unwrap();

        let err = controller
            .update_dispatcher_config("acme", "dev", &DispatcherConfig::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let mut data = BTreeMap::new();
        data.insert("dispatcher.any".to_owned(), "/farms {}".to_owned());
        let updated = controller
            .update_dispatcher_config(
                "acme",
                "dev",
                &DispatcherConfig {
                    name: "dev-dispatcher".to_owned(),
                    data: data.clone(),
                    ..DispatcherConfig::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.data, data);

        let fetched = controller.dispatcher_config("acme", "dev").await.unwrap();
        assert_eq!(fetched.data, data);
    }
}
