//! Cluster resource model and client interface for quarry.
//!
//! This crate defines the declarative resource descriptors the
//! provisioning layer produces (workloads, services, routes, jobs,
//! secrets, config maps, namespaces, certificates, content-management
//! deployments) and the [`ClusterClient`] trait through which they are
//! realized against a cluster API.
//!
//! The cluster itself is an external collaborator: this crate carries no
//! opinion about which API server sits behind the trait. [`MemoryCluster`]
//! is the in-process implementation used by tests and local development.

#![forbid(unsafe_code)]

mod client;
mod cms;
mod error;
mod memory;
mod pod;
mod resources;

pub use client::ClusterClient;
pub use cms::{CmsDeploymentResource, CmsDeploymentSpec, CmsDeploymentStatus, RoleSpec};
pub use error::{ClusterError, ClusterResult};
pub use memory::MemoryCluster;
pub use pod::{Pod, PodCondition, PodPhase, PodStatus};
pub use resources::{
    Certificate, ConfigMapResource, Container, ContainerPort, EnvVar, Job, Metadata, Namespace,
    Route, RouteRule, RouteTls, SecretResource, Service, ServicePort, Volume, VolumeMount,
    VolumeSource, Workload,
};
