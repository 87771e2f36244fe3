//! Artifactory (nexus) resource generators.

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

/// TCP port the nexus server listens on.
pub const PORT: u16 = 8081;

const INIT_JOB_IMAGE: &str = "quarry/init-nexus:1.0.0";

/// The nexus vendor entry and its deployable images.
#[must_use]
pub fn vendor() -> Vendor {
    Vendor {
        name: "nexus".to_owned(),
        images: vec![
            Image::new("quarry/nexus:3.8.0"),
            Image::new("quarry/nexus:3.9.0"),
            Image::new("quarry/nexus:3.12.0"),
        ],
    }
}

/// Single-replica nexus server workload.
#[must_use]
pub fn workload(settings: &StackSettings, namespace: &str, image: &str) -> Workload {
    let names = VendorNames::new("nexus");
    let labels = stack_labels(&names.workload);
    Workload {
        metadata: Metadata::new(&names.workload, namespace).with_labels(labels.clone()),
        replicas: 1,
        service_name: names.service.clone(),
        selector: labels,
        containers: vec![Container {
            name: names.workload.clone(),
            image: settings.image_ref(image),
            pull_always: false,
            env: Vec::new(),
            ports: vec![ContainerPort { port: PORT }],
            volume_mounts: Vec::new(),
        }],
        volumes: Vec::new(),
    }
}

/// Internal service fronting the nexus server.
#[must_use]
pub fn service(namespace: &str) -> Service {
    vendor_service(&VendorNames::new("nexus"), namespace, PORT)
}

/// External route for the nexus server.
#[must_use]
pub fn route(settings: &StackSettings, namespace: &str) -> Route {
    vendor_route(&VendorNames::new("nexus"), namespace, settings)
}

/// Secret carrying the nexus init configuration payload.
#[must_use]
pub fn secret(namespace: &str, payload: Vec<u8>) -> SecretResource {
    init_secret(&VendorNames::new("nexus"), namespace, payload)
}

/// One-shot job applying the init configuration against a running server.
#[must_use]
pub fn init_job(settings: &StackSettings, namespace: &str, nexus_host: &str) -> Job {
    let names = VendorNames::new("nexus");
    Job {
        metadata: Metadata::new(&names.init_job, namespace)
            .with_labels(stack_labels(&names.workload)),
        backoff_limit: 3,
        containers: vec![Container {
            name: names.init_job.clone(),
            image: settings.image_ref(INIT_JOB_IMAGE),
            pull_always: true,
            env: vec![
                EnvVar::new("NEXUS_USER", "admin"),
                EnvVar::new("NEXUS_PASS", "admin123"),
                EnvVar::new("NEXUS_HOST", nexus_host),
                EnvVar::new(
                    "NEXUS_CONFIG_FILE",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workload_is_deterministic() {
        let settings = StackSettings::default();
        let a = workload(&settings, "acme", "quarry/nexus:3.12.0");
        let b = workload(&settings, "acme", "quarry/nexus:3.12.0");
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
        assert_eq!(a.replicas, 1);
        assert_eq!(a.containers[0].ports[0].port, PORT);
        assert_eq!(a.containers[0].image, "registry.local/quarry/nexus:3.12.0");
    }

    #[test]
    fn init_job_wires_config_through_secret_volume() {
        let job = init_job(&StackSettings::default(), "acme", "http://nexus-srvc");
        assert_eq!(job.backoff_limit, 3);
        let c = &job.containers[0];
        assert!(c.pull_always);
        assert!(c
            .env
            .iter()
            .any(|e| e.name == "NEXUS_CONFIG_FILE" && e.value == "/app/config/configFile.json"));
        assert_eq!(
            job.volumes[0].source,
            VolumeSource::Secret {
                secret_name: "nexus-init-config".to_owned()
            }
        );
    }

    #[test]
    fn vendor_lists_available_images() {
        let v = vendor();
        assert_eq!(v.name, "nexus");
        assert_eq!(v.images.len(), 3);
    }
}
