//! CI (drone) resource generators.
//!
//! Drone deploys as a two-container workload: the server plus a build
//! agent talking to it over localhost. It has no init job; it wires
//! itself to the SCM server through environment variables instead.

use quarry_cluster::{
    Container, ContainerPort, EnvVar, Metadata, Route, Service, Volume, VolumeMount, VolumeSource,
    Workload,
};

use crate::names::VendorNames;
use crate::types::{Image, Vendor};

use super::{stack_labels, vendor_route, vendor_service, StackSettings};

/// TCP port the drone server serves HTTP on.
pub const PORT: u16 = 8000;
/// Internal port the agent uses to reach the server.
pub const SERVER_PORT: u16 = 9000;

const POD_INFO_VOLUME: &str = "podinfo";
const DIND_VOLUME: &str = "dind-socket";
const DB_VOLUME: &str = "drone-server-sqlite-db";
const SHARED_SECRET: &str = "somesecret";

/// The drone vendor entry. Each image pairs a server with its agent.
#[must_use]
pub fn vendor() -> Vendor {
    Vendor {
        name: "drone".to_owned(),
        images: vec![Image::with_secondary(
            "quarry/drone:0.8-alpine",
            "quarry/drone-agent:0.8",
        )],
    }
}

fn server(
    settings: &StackSettings,
    scm_url: &str,
    drone_host: &str,
    image: &str,
    workload_name: &str,
) -> Container {
    Container {
        name: workload_name.to_owned(),
        image: settings.image_ref(image),
        pull_always: false,
        env: vec![
            EnvVar::new("DRONE_OPEN", "true"),
            EnvVar::new("DRONE_DEBUG", "true"),
            EnvVar::new("DRONE_SECRET", SHARED_SECRET),
            EnvVar::new("DRONE_GOGS", "true"),
            EnvVar::new("DRONE_GOGS_URL", scm_url),
            EnvVar::new("DOCKER_API_VERSION", "1.23"),
            EnvVar::new("DRONE_HOST", drone_host),
        ],
        ports: vec![
            ContainerPort { port: PORT },
            ContainerPort { port: SERVER_PORT },
        ],
        volume_mounts: vec![
            VolumeMount {
                name: POD_INFO_VOLUME.to_owned(),
                mount_path: "/meta".to_owned(),
                read_only: false,
            },
            VolumeMount {
                name: DB_VOLUME.to_owned(),
                mount_path: "/var/lib/drone".to_owned(),
                read_only: false,
            },
            VolumeMount {
                name: DIND_VOLUME.to_owned(),
                mount_path: "/var/run/docker.sock".to_owned(),
                read_only: false,
            },
        ],
    }
}

fn agent(settings: &StackSettings, image: &str) -> Container {
    Container {
        name: "drone-agent".to_owned(),
        image: settings.image_ref(image),
        pull_always: false,
        env: vec![
            EnvVar::new("DRONE_SERVER", format!("localhost:{SERVER_PORT}")),
            EnvVar::new("DRONE_SECRET", SHARED_SECRET),
        ],
        ports: Vec::new(),
        volume_mounts: vec![VolumeMount {
            name: DIND_VOLUME.to_owned(),
            mount_path: "/var/run/docker.sock".to_owned(),
            read_only: false,
        }],
    }
}

/// Single-replica server+agent workload.
#[must_use]
pub fn workload(
    settings: &StackSettings,
    namespace: &str,
    scm_url: &str,
    drone_host: &str,
    server_image: &str,
    agent_image: &str,
) -> Workload {
    let names = VendorNames::new("drone");
    let labels = stack_labels(&names.workload);
    Workload {
        metadata: Metadata::new(&names.workload, namespace).with_labels(labels.clone()),
        replicas: 1,
        service_name: names.service.clone(),
        selector: labels,
        containers: vec![
            server(settings, scm_url, drone_host, server_image, &names.workload),
            agent(settings, agent_image),
        ],
        volumes: vec![
            Volume {
                name: POD_INFO_VOLUME.to_owned(),
                source: VolumeSource::PodInfo {
                    path: "labels.properties".to_owned(),
                },
            },
            Volume {
                name: DIND_VOLUME.to_owned(),
                source: VolumeSource::HostPath {
                    path: "/var/run/docker.sock".to_owned(),
                },
            },
            Volume {
                name: DB_VOLUME.to_owned(),
                source: VolumeSource::EmptyDir,
            },
        ],
    }
}

/// Internal service fronting the drone server.
#[must_use]
pub fn service(namespace: &str) -> Service {
    vendor_service(&VendorNames::new("drone"), namespace, PORT)
}

/// External route for the drone server.
#[must_use]
pub fn route(settings: &StackSettings, namespace: &str) -> Route {
    vendor_route(&VendorNames::new("drone"), namespace, settings)
}
