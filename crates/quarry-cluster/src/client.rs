//! The cluster collaborator interface.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::cms::CmsDeploymentResource;
use crate::error::ClusterResult;
use crate::pod::Pod;
use crate::resources::{
    Certificate, ConfigMapResource, Job, Namespace, Route, SecretResource, Service, Workload,
};

/// Asynchronous interface to the cluster resource API.
///
/// Each `create_*` either returns the created resource, reports a
/// structured [`ClusterError::AlreadyExists`](crate::ClusterError) or
/// fails. Updates are only offered where the provisioning layer needs
/// them (config maps and content-management deployments); everything
/// else is create/get/delete only.
///
/// Implementations own their network timeouts; callers never retry.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    // Namespaces and certificates.

    /// Create an isolation namespace.
    async fn create_namespace(&self, namespace: Namespace) -> ClusterResult<Namespace>;

    /// Fetch a namespace by name.
    async fn get_namespace(&self, name: &str) -> ClusterResult<Namespace>;

    /// List all namespaces managed by this stack.
    async fn list_namespaces(&self) -> ClusterResult<Vec<Namespace>>;

    /// Delete a namespace; the cluster cascades to everything inside it.
    async fn delete_namespace(&self, name: &str) -> ClusterResult<()>;

    /// Request a TLS certificate in a namespace.
    async fn create_certificate(&self, certificate: Certificate) -> ClusterResult<Certificate>;

    // Network services.

    /// Create a network service.
    async fn create_service(&self, namespace: &str, service: Service) -> ClusterResult<Service>;

    /// Fetch a network service by name.
    async fn get_service(&self, namespace: &str, name: &str) -> ClusterResult<Service>;

    /// Delete a network service.
    async fn delete_service(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    // External routes.

    /// Create an external route.
    async fn create_route(&self, namespace: &str, route: Route) -> ClusterResult<Route>;

    /// Fetch an external route by name.
    async fn get_route(&self, namespace: &str, name: &str) -> ClusterResult<Route>;

    /// Delete an external route.
    async fn delete_route(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    // Stateful workloads.

    /// Create a stateful workload.
    async fn create_workload(&self, namespace: &str, workload: Workload) -> ClusterResult<Workload>;

    /// Fetch a stateful workload by name.
    async fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<Workload>;

    /// Delete a stateful workload.
    async fn delete_workload(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    // One-shot jobs.

    /// Create a one-shot job.
    async fn create_job(&self, namespace: &str, job: Job) -> ClusterResult<Job>;

    /// Delete a job.
    async fn delete_job(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    // Secrets.

    /// Create an opaque secret.
    async fn create_secret(
        &self,
        namespace: &str,
        secret: SecretResource,
    ) -> ClusterResult<SecretResource>;

    /// Fetch a secret by name.
    async fn get_secret(&self, namespace: &str, name: &str) -> ClusterResult<SecretResource>;

    /// Delete a secret.
    async fn delete_secret(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    // Config maps.

    /// Create a config map.
    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: ConfigMapResource,
    ) -> ClusterResult<ConfigMapResource>;

    /// Fetch a config map by name.
    async fn get_config_map(&self, namespace: &str, name: &str)
        -> ClusterResult<ConfigMapResource>;

    /// Replace the data of an existing config map.
    async fn update_config_map(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> ClusterResult<ConfigMapResource>;

    /// Delete a config map.
    async fn delete_config_map(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    // Content-management deployments.

    /// Create a content-management deployment.
    async fn create_cms_deployment(
        &self,
        namespace: &str,
        deployment: CmsDeploymentResource,
    ) -> ClusterResult<CmsDeploymentResource>;

    /// Fetch a content-management deployment by environment name.
    async fn get_cms_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClusterResult<CmsDeploymentResource>;

    /// Replace the spec of an existing content-management deployment.
    async fn update_cms_deployment(
        &self,
        namespace: &str,
        deployment: CmsDeploymentResource,
    ) -> ClusterResult<CmsDeploymentResource>;

    /// Delete a content-management deployment.
    async fn delete_cms_deployment(&self, namespace: &str, name: &str) -> ClusterResult<()>;

    /// List all content-management deployments in a namespace.
    async fn list_cms_deployments(
        &self,
        namespace: &str,
    ) -> ClusterResult<Vec<CmsDeploymentResource>>;

    // Pods.

    /// List pods matching every label in `selector`.
    async fn list_pods(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> ClusterResult<Vec<Pod>>;
}
