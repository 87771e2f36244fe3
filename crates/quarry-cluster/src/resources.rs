//! Declarative cluster resource descriptors.
//!
//! These are the wire shapes the provisioning layer hands to a
//! [`ClusterClient`](crate::ClusterClient). They are deliberately plain
//! data: generators must produce byte-identical descriptors for identical
//! inputs, which is why every map here is a `BTreeMap`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Common object metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Resource name, unique per kind within a namespace.
    pub name: String,
    /// Namespace the resource lives in.
    pub namespace: String,
    /// Identifying labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Free-form annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

impl Metadata {
    /// Create metadata with a name and namespace.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            labels: BTreeMap::new(),
            annotations: BTreeMap::new(),
        }
    }

    /// Attach labels.
    #[must_use]
    pub fn with_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    /// Attach annotations.
    #[must_use]
    pub fn with_annotations(mut self, annotations: BTreeMap<String, String>) -> Self {
        self.annotations = annotations;
        self
    }
}

/// An environment variable injected into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    /// Variable name.
    pub name: String,
    /// Literal value.
    pub value: String,
}

impl EnvVar {
    /// Create an environment variable.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A port exposed by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerPort {
    /// TCP port number.
    pub port: u16,
}

/// A volume mounted into a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Name of the volume to mount.
    pub name: String,
    /// Mount path inside the container.
    pub mount_path: String,
    /// Whether the mount is read-only.
    #[serde(default)]
    pub read_only: bool,
}

/// Backing source for a volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VolumeSource {
    /// Contents of a named secret.
    Secret {
        /// Secret resource name.
        secret_name: String,
    },
    /// Pod metadata (labels) projected as files.
    PodInfo {
        /// File path the labels are written to.
        path: String,
    },
    /// A path on the host node.
    HostPath {
        /// Host filesystem path.
        path: String,
    },
    /// Ephemeral scratch space.
    EmptyDir,
}

/// A named volume available to a workload's containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume name, referenced by [`VolumeMount`]s.
    pub name: String,
    /// Where the volume contents come from.
    pub source: VolumeSource,
}

/// A single container within a workload or job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Fully qualified image reference.
    pub image: String,
    /// Always pull the image before starting.
    #[serde(default)]
    pub pull_always: bool,
    /// Environment variables.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    /// Exposed ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Volume mounts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
}

/// A stateful workload (single-replica server process).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Object metadata.
    pub metadata: Metadata,
    /// Desired replica count.
    pub replicas: i32,
    /// Name of the governing network service.
    pub service_name: String,
    /// Pod label selector.
    pub selector: BTreeMap<String, String>,
    /// Containers in each replica.
    pub containers: Vec<Container>,
    /// Volumes shared by the containers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

/// A port exposed by a network service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    /// Port name.
    pub name: String,
    /// Externally visible port.
    pub port: u16,
    /// Container port traffic is forwarded to.
    pub target_port: u16,
}

/// An internal network service fronting a workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Object metadata.
    pub metadata: Metadata,
    /// Exposed ports.
    pub ports: Vec<ServicePort>,
    /// Pod label selector.
    pub selector: BTreeMap<String, String>,
}

/// A single host rule on an external route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Externally reachable host name.
    pub host: String,
    /// URL path prefix.
    pub path: String,
    /// Backing service name.
    pub service_name: String,
    /// Backing service port.
    pub service_port: u16,
}

/// TLS termination settings for a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTls {
    /// Hosts covered by the certificate.
    pub hosts: Vec<String>,
    /// Secret holding the certificate material.
    pub secret_name: String,
}

/// An externally reachable route to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Object metadata (annotations carry the route class and
    /// ssl-redirect settings).
    pub metadata: Metadata,
    /// Host rules; the first rule defines the canonical external host.
    pub rules: Vec<RouteRule>,
    /// TLS settings, if terminated at the edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<RouteTls>,
}

impl Route {
    /// The external host from the first declared rule, if any.
    #[must_use]
    pub fn external_host(&self) -> Option<&str> {
        self.rules.first().map(|r| r.host.as_str())
    }
}

/// A one-shot initialization job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Object metadata.
    pub metadata: Metadata,
    /// Retry budget before the job is marked failed.
    pub backoff_limit: i32,
    /// Containers run to completion.
    pub containers: Vec<Container>,
    /// Volumes available to the containers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

/// An opaque secret resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretResource {
    /// Object metadata.
    pub metadata: Metadata,
    /// Opaque payload, keyed by file name.
    pub data: BTreeMap<String, Vec<u8>>,
}

/// A config map resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapResource {
    /// Object metadata.
    pub metadata: Metadata,
    /// String payload.
    pub data: BTreeMap<String, String>,
}

/// An isolation namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Namespace name (the client identifier).
    pub name: String,
    /// Identifying labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Client metadata carried as annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A TLS certificate request handled by the cluster's certificate manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Object metadata.
    pub metadata: Metadata,
    /// Secret the issued certificate is written to.
    pub secret_name: String,
    /// DNS names covered by the certificate.
    pub dns_names: Vec<String>,
    /// Issuer name.
    pub issuer: String,
    /// DNS challenge provider.
    pub dns_provider: String,
}
