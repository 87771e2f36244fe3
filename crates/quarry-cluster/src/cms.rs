//! Content-management deployment custom resource.
//!
//! The cluster runs an operator that reconciles this resource into the
//! actual author/publisher/dispatcher processes; the provisioning layer
//! only creates, updates and deletes the declarative form.

use serde::{Deserialize, Serialize};

use crate::resources::Metadata;

/// Sizing for one role of a content-management deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSpec {
    /// Instance type, e.g. "small".
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Number of replicas.
    pub replicas: i32,
}

/// Spec of a content-management deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsDeploymentSpec {
    /// Author role sizing.
    pub authors: RoleSpec,
    /// Publisher role sizing.
    pub publishers: RoleSpec,
    /// Dispatcher role sizing.
    pub dispatchers: RoleSpec,
    /// Software version, e.g. "6.3".
    pub version: String,
    /// Companion dispatcher process version.
    pub dispatcher_version: String,
}

/// Observed status of a content-management deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsDeploymentStatus {
    /// Operator-reported phase, mirrored verbatim to callers.
    #[serde(default)]
    pub phase: String,
}

/// The content-management deployment resource.
///
/// Named after the environment and namespaced by the client identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsDeploymentResource {
    /// Object metadata; `metadata.name` is the environment identifier.
    pub metadata: Metadata,
    /// Desired spec.
    pub spec: CmsDeploymentSpec,
    /// Observed status.
    #[serde(default)]
    pub status: CmsDeploymentStatus,
}
