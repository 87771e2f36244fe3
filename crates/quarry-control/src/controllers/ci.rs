//! Continuous-integration controller.

use std::sync::Arc;

use quarry_cluster::ClusterClient;
use quarry_core::catalog::{self, VendorCategory};
use quarry_core::names::VendorNames;
use quarry_core::stack::{drone, StackSettings};
use quarry_core::types::{Ci, Vendor};
use tracing::info;

use crate::controllers::check_client;
use crate::error::{ControlError, ControlResult};

/// Provisions and tears down continuous-integration servers.
pub struct CiController {
    cluster: Arc<dyn ClusterClient>,
    settings: StackSettings,
}

impl CiController {
    /// Create a controller over the given cluster client.
    #[must_use]
    pub fn new(cluster: Arc<dyn ClusterClient>, settings: StackSettings) -> Self {
        Self { cluster, settings }
    }

    /// The vendors this controller can provision.
    #[must_use]
    pub fn vendors(&self) -> Vec<Vendor> {
        catalog::vendors_for(VendorCategory::Ci)
    }

    fn validate(ci: &Ci) -> ControlResult<()> {
        if ci.image.is_empty() || ci.second_image.is_empty() {
            return Err(ControlError::validation("image and secondImage are required"));
        }
        if ci.scm_url.is_empty() {
            return Err(ControlError::validation(
                "scmURL (Source Control manager URL) is required",
            ));
        }
        if !catalog::is_valid_vendor(VendorCategory::Ci, &ci.ci_id) {
            return Err(ControlError::validation("unknown ciId"));
        }
        Ok(())
    }

    /// Provision a CI server, populating `ci` with the created resource
    /// names and external host.
    ///
    /// The external host is needed by the workload's own environment, so
    /// the route is created before the workload.
    pub async fn create(&self, client_id: &str, ci: &mut Ci) -> ControlResult<()> {
        Self::validate(ci)?;
        check_client(&self.cluster, client_id).await?;

        let service = self
            .cluster
            .create_service(client_id, drone::service(client_id))
            .await?;
        let route = self
            .cluster
            .create_route(client_id, drone::route(&self.settings, client_id))
            .await?;
        if let Some(host) = route.external_host() {
            ci.host = format!("https://{host}");
        }
        let workload = self
            .cluster
            .create_workload(
                client_id,
                drone::workload(
                    &self.settings,
                    client_id,
                    &ci.scm_url,
                    &ci.host,
                    &ci.image,
                    &ci.second_image,
                ),
            )
            .await?;

        ci.server_name = workload.metadata.name;
        ci.service_name = service.metadata.name;
        ci.route_name = route.metadata.name;

        info!(client_id, host = %ci.host, "ci created");
        Ok(())
    }

    /// Read a CI server back from its live resources.
    pub async fn get(&self, client_id: &str, ci_id: &str) -> ControlResult<Ci> {
        check_client(&self.cluster, client_id).await?;
        if !catalog::is_valid_vendor(VendorCategory::Ci, ci_id) {
            return Err(ControlError::validation("unknown ciId"));
        }

        let names = VendorNames::new(ci_id);
        let workload = self.cluster.get_workload(client_id, &names.workload).await?;
        let service = self.cluster.get_service(client_id, &names.service).await?;
        let route = self.cluster.get_route(client_id, &names.route).await?;

        let host = route
            .external_host()
            .map(|host| format!("https://{host}"))
            .unwrap_or_default();
        Ok(Ci {
            ci_id: ci_id.to_owned(),
            server_name: workload.metadata.name,
            service_name: service.metadata.name,
            route_name: route.metadata.name,
            host,
            ..Ci::default()
        })
    }

    /// Updates are not offered.
    pub fn update(&self) -> ControlResult<Ci> {
        Err(ControlError::NotSupported)
    }

    /// Tear down a CI server. There is no init job or secret to remove.
    pub async fn delete(&self, client_id: &str, ci_id: &str) -> ControlResult<()> {
        check_client(&self.cluster, client_id).await?;
        let names = VendorNames::new(ci_id);

        self.cluster.delete_workload(client_id, &names.workload).await?;
        self.cluster.delete_service(client_id, &names.service).await?;
        self.cluster.delete_route(client_id, &names.route).await?;

        info!(client_id, ci_id, "ci deleted");
        Ok(())
    }
}
