//! In-memory cluster backend for testing and local development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::client::ClusterClient;
use crate::cms::CmsDeploymentResource;
use crate::error::{ClusterError, ClusterResult};
use crate::pod::Pod;
use crate::resources::{
    Certificate, ConfigMapResource, Job, Namespace, Route, SecretResource, Service, Workload,
};

type Key = (String, String);

#[derive(Debug, Default)]
struct State {
    namespaces: HashMap<String, Namespace>,
    certificates: HashMap<Key, Certificate>,
    services: HashMap<Key, Service>,
    routes: HashMap<Key, Route>,
    workloads: HashMap<Key, Workload>,
    jobs: HashMap<Key, Job>,
    secrets: HashMap<Key, SecretResource>,
    config_maps: HashMap<Key, ConfigMapResource>,
    cms_deployments: HashMap<Key, CmsDeploymentResource>,
    pods: HashMap<Key, Pod>,
}

/// In-memory [`ClusterClient`] implementation.
///
/// Every trait call increments an operation counter, which the test
/// suite uses to prove that validation failures happen before any
/// collaborator call. Not intended for production use; resources are
/// not persisted across restarts.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: RwLock<State>,
    operations: AtomicUsize,
}

impl MemoryCluster {
    /// Create an empty in-memory cluster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of collaborator calls made so far.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    /// Seed a pod into a namespace, for testing pod listing.
    pub fn insert_pod(&self, namespace: &str, pod: Pod) -> ClusterResult<()> {
        let mut state = self.write()?;
        state
            .pods
            .insert((namespace.to_owned(), pod.metadata.name.clone()), pod);
        Ok(())
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    fn read(&self) -> ClusterResult<std::sync::RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| ClusterError::api("lock poisoned"))
    }

    fn write(&self) -> ClusterResult<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| ClusterError::api("lock poisoned"))
    }
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_owned(), name.to_owned())
}

#[async_trait]
impl ClusterClient for MemoryCluster {
    async fn create_namespace(&self, namespace: Namespace) -> ClusterResult<Namespace> {
        self.record();
        let mut state = self.write()?;
        if state.namespaces.contains_key(&namespace.name) {
            return Err(ClusterError::already_exists("namespace", namespace.name));
        }
        state
            .namespaces
            .insert(namespace.name.clone(), namespace.clone());
        Ok(namespace)
    }

    async fn get_namespace(&self, name: &str) -> ClusterResult<Namespace> {
        self.record();
        let state = self.read()?;
        state
            .namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| ClusterError::not_found("namespace", name))
    }

    async fn list_namespaces(&self) -> ClusterResult<Vec<Namespace>> {
        self.record();
        let state = self.read()?;
        let mut namespaces: Vec<Namespace> = state.namespaces.values().cloned().collect();
        namespaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(namespaces)
    }

    async fn delete_namespace(&self, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        if state.namespaces.remove(name).is_none() {
            return Err(ClusterError::not_found("namespace", name));
        }
        // Deleting a namespace cascades to everything inside it.
        state.certificates.retain(|(ns, _), _| ns != name);
        state.services.retain(|(ns, _), _| ns != name);
        state.routes.retain(|(ns, _), _| ns != name);
        state.workloads.retain(|(ns, _), _| ns != name);
        state.jobs.retain(|(ns, _), _| ns != name);
        state.secrets.retain(|(ns, _), _| ns != name);
        state.config_maps.retain(|(ns, _), _| ns != name);
        state.cms_deployments.retain(|(ns, _), _| ns != name);
        state.pods.retain(|(ns, _), _| ns != name);
        Ok(())
    }

    async fn create_certificate(&self, certificate: Certificate) -> ClusterResult<Certificate> {
        self.record();
        let mut state = self.write()?;
        let k = key(&certificate.metadata.namespace, &certificate.metadata.name);
        if state.certificates.contains_key(&k) {
            return Err(ClusterError::already_exists("certificate", k.1));
        }
        state.certificates.insert(k, certificate.clone());
        Ok(certificate)
    }

    async fn create_service(&self, namespace: &str, service: Service) -> ClusterResult<Service> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &service.metadata.name);
        if state.services.contains_key(&k) {
            return Err(ClusterError::already_exists("service", k.1));
        }
        state.services.insert(k, service.clone());
        Ok(service)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClusterResult<Service> {
        self.record();
        let state = self.read()?;
        state
            .services
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::not_found("service", name))
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .services
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("service", name))
    }

    async fn create_route(&self, namespace: &str, route: Route) -> ClusterResult<Route> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &route.metadata.name);
        if state.routes.contains_key(&k) {
            return Err(ClusterError::already_exists("route", k.1));
        }
        state.routes.insert(k, route.clone());
        Ok(route)
    }

    async fn get_route(&self, namespace: &str, name: &str) -> ClusterResult<Route> {
        self.record();
        let state = self.read()?;
        state
            .routes
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::not_found("route", name))
    }

    async fn delete_route(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .routes
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("route", name))
    }

    async fn create_workload(
        &self,
        namespace: &str,
        workload: Workload,
    ) -> ClusterResult<Workload> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &workload.metadata.name);
        if state.workloads.contains_key(&k) {
            return Err(ClusterError::already_exists("workload", k.1));
        }
        state.workloads.insert(k, workload.clone());
        Ok(workload)
    }

    async fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<Workload> {
        self.record();
        let state = self.read()?;
        state
            .workloads
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::not_found("workload", name))
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .workloads
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("workload", name))
    }

    async fn create_secret(
        &self,
        namespace: &str,
        secret: SecretResource,
    ) -> ClusterResult<SecretResource> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &secret.metadata.name);
        if state.secrets.contains_key(&k) {
            return Err(ClusterError::already_exists("secret", k.1));
        }
        state.secrets.insert(k, secret.clone());
        Ok(secret)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> ClusterResult<SecretResource> {
        self.record();
        let state = self.read()?;
        state
            .secrets
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::not_found("secret", name))
    }

    async fn delete_secret(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .secrets
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("secret", name))
    }

    async fn create_config_map(
        &self,
        namespace: &str,
        config_map: ConfigMapResource,
    ) -> ClusterResult<ConfigMapResource> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &config_map.metadata.name);
        if state.config_maps.contains_key(&k) {
            return Err(ClusterError::already_exists("config map", k.1));
        }
        state.config_maps.insert(k, config_map.clone());
        Ok(config_map)
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClusterResult<ConfigMapResource> {
        self.record();
        let state = self.read()?;
        state
            .config_maps
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::not_found("config map", name))
    }

    async fn delete_config_map(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .config_maps
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("config map", name))
    }

    async fn create_job(&self, namespace: &str, job: Job) -> ClusterResult<Job> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &job.metadata.name);
        if state.jobs.contains_key(&k) {
            return Err(ClusterError::already_exists("job", k.1));
        }
        state.jobs.insert(k, job.clone());
        Ok(job)
    }

    async fn delete_job(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .jobs
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("job", name))
    }

    async fn update_config_map(
        &self,
        namespace: &str,
        name: &str,
        data: BTreeMap<String, String>,
    ) -> ClusterResult<ConfigMapResource> {
        self.record();
        let mut state = self.write()?;
        let config_map = state
            .config_maps
            .get_mut(&key(namespace, name))
            .ok_or_else(|| ClusterError::not_found("config map", name))?;
        config_map.data = data;
        Ok(config_map.clone())
    }

    async fn create_cms_deployment(
        &self,
        namespace: &str,
        deployment: CmsDeploymentResource,
    ) -> ClusterResult<CmsDeploymentResource> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &deployment.metadata.name);
        if state.cms_deployments.contains_key(&k) {
            return Err(ClusterError::already_exists(
                "content-management deployment",
                k.1,
            ));
        }
        state.cms_deployments.insert(k, deployment.clone());
        Ok(deployment)
    }

    async fn get_cms_deployment(
        &self,
        namespace: &str,
        name: &str,
    ) -> ClusterResult<CmsDeploymentResource> {
        self.record();
        let state = self.read()?;
        state
            .cms_deployments
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::not_found("content-management deployment", name))
    }

    async fn update_cms_deployment(
        &self,
        namespace: &str,
        deployment: CmsDeploymentResource,
    ) -> ClusterResult<CmsDeploymentResource> {
        self.record();
        let mut state = self.write()?;
        let k = key(namespace, &deployment.metadata.name);
        let existing = state
            .cms_deployments
            .get_mut(&k)
            .ok_or_else(|| ClusterError::not_found("content-management deployment", k.1.clone()))?;
        existing.spec = deployment.spec;
        Ok(existing.clone())
    }

    async fn delete_cms_deployment(&self, namespace: &str, name: &str) -> ClusterResult<()> {
        self.record();
        let mut state = self.write()?;
        state
            .cms_deployments
            .remove(&key(namespace, name))
            .map(|_| ())
            .ok_or_else(|| ClusterError::not_found("content-management deployment", name))
    }

    async fn list_cms_deployments(
        &self,
        namespace: &str,
    ) -> ClusterResult<Vec<CmsDeploymentResource>> {
        self.record();
        let state = self.read()?;
        let mut deployments: Vec<CmsDeploymentResource> = state
            .cms_deployments
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, d)| d.clone())
            .collect();
        deployments.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Ok(deployments)
    }

    async fn list_pods(
        &self,
        namespace: &str,
        selector: &BTreeMap<String, String>,
    ) -> ClusterResult<Vec<Pod>> {
        self.record();
        let state = self.read()?;
        let mut pods: Vec<Pod> = state
            .pods
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, p)| p.clone())
            .filter(|p| {
                selector
                    .iter()
                    .all(|(k, v)| p.metadata.labels.get(k) == Some(v))
            })
            .collect();
        pods.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
        Ok(pods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Metadata;

    fn service(namespace: &str, name: &str) -> Service {
        Service {
            metadata: Metadata::new(name, namespace),
            ports: vec![],
            selector: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn create_twice_reports_already_exists() {
        let cluster = MemoryCluster::new();
        cluster
            .create_service("acme", service("acme", "nexus-srvc"))
            .await
            .unwrap();

        let err = cluster
            .create_service("acme", service("acme", "nexus-srvc"))
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn operations_are_counted() {
        let cluster = MemoryCluster::new();
        assert_eq!(cluster.operation_count(), 0);

        cluster
            .create_service("acme", service("acme", "nexus-srvc"))
            .await
            .unwrap();
        let _ = cluster.get_service("acme", "nexus-srvc").await;
        assert_eq!(cluster.operation_count(), 2);
    }

    #[tokio::test]
    async fn namespace_delete_cascades() {
        let cluster = MemoryCluster::new();
        cluster
            .create_namespace(Namespace {
                name: "acme".to_owned(),
                labels: BTreeMap::new(),
                annotations: BTreeMap::new(),
            })
            .await
            .unwrap();
        cluster
            .create_service("acme", service("acme", "nexus-srvc"))
            .await
            .unwrap();

        cluster.delete_namespace("acme").await.unwrap();
        let err = cluster.get_service("acme", "nexus-srvc").await.unwrap_err();
        assert!(matches!(err, ClusterError::NotFound { .. }));
    }
}
