//! Source-control (gogs) resource generators.

use quarry_cluster::{
    Container, ContainerPort, EnvVar, Job, Metadata, Route, SecretResource, Service, Volume,
    VolumeMount, VolumeSource, Workload,
};

use crate::names::VendorNames;
use crate::types::{Image, Vendor};

use super::{
    init_secret, stack_labels, vendor_route, vendor_service, StackSettings, INIT_CONFIG_FILE,
    INIT_CONFIG_MOUNT, INIT_CONFIG_VOLUME,
};

/// TCP port the gogs server listens on.
pub const PORT: u16 = 3000;

const INIT_JOB_IMAGE: &str = "quarry/init-gogs:1.0.0";
const POD_INFO_VOLUME: &str = "podinfo";

/// The gogs vendor entry and its deployable images.
#[must_use]
pub fn vendor() -> Vendor {
    Vendor {
        name: "gogs".to_owned(),
        images: vec![Image::new("quarry/gogs:0.11.34")],
    }
}

/// Single-replica gogs server workload.
#[must_use]
pub fn workload(settings: &StackSettings, namespace: &str, image: &str) -> Workload {
    let names = VendorNames::new("gogs");
    let labels = stack_labels(&names.workload);
    Workload {
        metadata: Metadata::new(&names.workload, namespace).with_labels(labels.clone()),
        replicas: 1,
        service_name: names.service.clone(),
        selector: labels,
        containers: vec![Container {
            name: "gogs".to_owned(),
            image: settings.image_ref(image),
            pull_always: false,
            env: vec![EnvVar::new("SOCAT_LINK", "false")],
            ports: vec![ContainerPort { port: PORT }],
            volume_mounts: vec![VolumeMount {
                name: POD_INFO_VOLUME.to_owned(),
                mount_path: "/meta".to_owned(),
                read_only: false,
            }],
        }],
        volumes: vec![Volume {
            name: POD_INFO_VOLUME.to_owned(),
            source: VolumeSource::PodInfo {
                path: "labels.properties".to_owned(),
            },
        }],
    }
}

/// Internal service fronting the gogs server.
#[must_use]
pub fn service(namespace: &str) -> Service {
    vendor_service(&VendorNames::new("gogs"), namespace, PORT)
}

/// External route for the gogs server.
#[must_use]
pub fn route(settings: &StackSettings, namespace: &str) -> Route {
    vendor_route(&VendorNames::new("gogs"), namespace, settings)
}

/// Secret carrying the gogs init configuration payload.
#[must_use]
pub fn secret(namespace: &str, payload: Vec<u8>) -> SecretResource {
    init_secret(&VendorNames::new("gogs"), namespace, payload)
}

/// One-shot job applying the init configuration against a running server.
#[must_use]
pub fn init_job(settings: &StackSettings, namespace: &str, gogs_host: &str) -> Job {
    let names = VendorNames::new("gogs");
    Job {
        metadata: Metadata::new(&names.init_job, namespace)
            .with_labels(stack_labels(&names.workload)),
        backoff_limit: 3,
        containers: vec![Container {
            name: names.init_job.clone(),
            image: settings.image_ref(INIT_JOB_IMAGE),
            pull_always: true,
            env: vec![
                EnvVar::new("GOGS_HOST", gogs_host),
                EnvVar::new(
                    "GOGS_CONFIG_FILE",
                    format!("{INIT_CONFIG_MOUNT}/{INIT_CONFIG_FILE}"),
                ),
            ],
            ports: Vec::new(),
            volume_mounts: vec![VolumeMount {
                name: INIT_CONFIG_VOLUME.to_owned(),
                mount_path: INIT_CONFIG_MOUNT.to_owned(),
                read_only: true,
            }],
        }],
        volumes: vec![Volume {
            name: INIT_CONFIG_VOLUME.to_owned(),
            source: VolumeSource::Secret {
                secret_name: names.init_secret,
            },
        }],
    }
}
