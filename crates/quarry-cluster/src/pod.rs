//! Pod status shapes and derived health checks.

use serde::{Deserialize, Serialize};

use crate::resources::Metadata;

/// Lifecycle phase of a pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PodPhase {
    /// Accepted but not yet scheduled or started.
    Pending,
    /// All containers started.
    Running,
    /// All containers terminated successfully.
    Succeeded,
    /// At least one container terminated in failure.
    Failed,
    /// State could not be obtained.
    Unknown,
}

/// A single status condition observed on a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodCondition {
    /// Condition type, e.g. "Ready".
    pub condition_type: String,
    /// Whether the condition currently holds.
    pub status: bool,
}

/// Observed pod status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodStatus {
    /// Current phase.
    pub phase: PodPhase,
    /// Status conditions, newest last.
    #[serde(default)]
    pub conditions: Vec<PodCondition>,
}

/// A member process of a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    /// Object metadata; labels carry the runmode and owning deployment.
    pub metadata: Metadata,
    /// Observed status.
    pub status: PodStatus,
}

impl Pod {
    /// True when the observed phase is `Running`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.phase == PodPhase::Running
    }

    /// True when the latest "Ready" condition holds.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status
            .conditions
            .iter()
            .rev()
            .find(|c| c.condition_type == "Ready")
            .is_some_and(|c| c.status)
    }
}
