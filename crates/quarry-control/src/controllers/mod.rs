//! Single-resource controllers.
//!
//! Each controller owns create/read/delete for one vendor category.
//! Validation always runs to completion before the first collaborator
//! call, so a rejected request provably changes nothing.

mod artifactory;
mod ci;
mod cms;
mod scm;

use std::sync::Arc;

use quarry_cluster::ClusterClient;

use crate::error::{ControlError, ControlResult};

pub use artifactory::ArtifactoryController;
pub use ci::CiController;
pub use cms::CmsController;
pub(crate) use cms::client_secret_path;
pub use scm::ScmController;

/// Confirm the client's namespace exists, rejecting unknown clients
/// before touching any of their resources.
pub(crate) async fn check_client(
    cluster: &Arc<dyn ClusterClient>,
    client_id: &str,
) -> ControlResult<()> {
    cluster
        .get_namespace(client_id)
        .await
        .map_err(|_| ControlError::validation("invalid clientId"))?;
    Ok(())
}
