//! Resource generators, one module per vendor.
//!
//! Generators are pure functions from (settings, namespace, inputs) to
//! declarative cluster resource descriptors. They never perform I/O, and
//! identical inputs always produce byte-identical descriptors so that a
//! re-provisioning attempt surfaces as "already exists" instead of
//! silently drifting.

pub mod drone;
pub mod gogs;
pub mod nexus;

use std::collections::BTreeMap;

use quarry_cluster::{Metadata, Route, RouteRule, RouteTls, Service, ServicePort};
use serde::{Deserialize, Serialize};

use crate::names::{tls_secret_name, VendorNames};

/// Annotation carrying the route class on generated routes.
pub const ROUTE_CLASS_ANNOTATION: &str = "quarry.dev/route-class";
/// Annotation forcing SSL redirection on generated routes.
pub const SSL_REDIRECT_ANNOTATION: &str = "quarry.dev/force-ssl-redirect";

/// Key the init-config secret payload is stored under.
pub const INIT_CONFIG_FILE: &str = "configFile.json";
/// Mount path for init-config payloads inside init-job containers.
pub const INIT_CONFIG_MOUNT: &str = "/app/config";
/// Volume name for the init-config mount.
pub const INIT_CONFIG_VOLUME: &str = "init-config";

/// Ambient platform settings the generators are parameterized by.
///
/// These were ambient environment variables in earlier iterations; they
/// are injected explicitly so generators stay pure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackSettings {
    /// Image registry every image reference is prefixed with.
    #[serde(default = "default_registry")]
    pub registry: String,
    /// DNS domain all external routes live under.
    #[serde(default = "default_external_domain")]
    pub external_domain: String,
    /// Route class handed to the edge controller.
    #[serde(default = "default_route_class")]
    pub route_class: String,
    /// Whether routes force SSL redirection.
    #[serde(default = "default_force_ssl_redirect")]
    pub force_ssl_redirect: bool,
}

fn default_registry() -> String {
    "registry.local".to_owned()
}

fn default_external_domain() -> String {
    "quarry.local".to_owned()
}

fn default_route_class() -> String {
    "nginx".to_owned()
}

const fn default_force_ssl_redirect() -> bool {
    true
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            registry: default_registry(),
            external_domain: default_external_domain(),
            route_class: default_route_class(),
            force_ssl_redirect: default_force_ssl_redirect(),
        }
    }
}

impl StackSettings {
    /// Fully qualified image reference under the platform registry.
    #[must_use]
    pub fn image_ref(&self, image: &str) -> String {
        format!("{}/{}", self.registry, image)
    }
}

/// Identifying labels stamped on every resource of one vendor stack.
pub(crate) fn stack_labels(workload: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_owned(), workload.to_owned());
    labels.insert("stack".to_owned(), "quarry".to_owned());
    labels
}

/// A cluster-internal service on port 80 forwarding to `target_port`.
pub(crate) fn vendor_service(
    names: &VendorNames,
    namespace: &str,
    target_port: u16,
) -> Service {
    let labels = stack_labels(&names.workload);
    Service {
        metadata: Metadata::new(&names.service, namespace).with_labels(labels.clone()),
        ports: vec![ServicePort {
            name: "http".to_owned(),
            port: 80,
            target_port,
        }],
        selector: labels,
    }
}

/// An external TLS route for the vendor's service.
pub(crate) fn vendor_route(
    names: &VendorNames,
    namespace: &str,
    settings: &StackSettings,
) -> Route {
    let host = names.external_host(namespace, &settings.external_domain);
    let mut annotations = BTreeMap::new();
    annotations.insert(
        ROUTE_CLASS_ANNOTATION.to_owned(),
        settings.route_class.clone(),
    );
    annotations.insert(
        SSL_REDIRECT_ANNOTATION.to_owned(),
        settings.force_ssl_redirect.to_string(),
    );

    Route {
        metadata: Metadata::new(&names.route, namespace)
            .with_labels(stack_labels(&names.workload))
            .with_annotations(annotations),
        rules: vec![RouteRule {
            host: host.clone(),
            path: "/".to_owned(),
            service_name: names.service.clone(),
            service_port: 80,
        }],
        tls: Some(RouteTls {
            hosts: vec![host],
            secret_name: tls_secret_name(namespace),
        }),
    }
}

/// An opaque secret holding an init-config payload.
pub(crate) fn init_secret(
    names: &VendorNames,
    namespace: &str,
    payload: Vec<u8>,
) -> quarry_cluster::SecretResource {
    let mut data = BTreeMap::new();
    data.insert(INIT_CONFIG_FILE.to_owned(), payload);
    quarry_cluster::SecretResource {
        metadata: Metadata::new(&names.init_secret, namespace)
            .with_labels(stack_labels(&names.workload)),
        data,
    }
}
