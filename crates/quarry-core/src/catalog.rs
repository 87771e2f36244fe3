//! Vendor and image catalogs.

use serde::{Deserialize, Serialize};

use crate::stack::{drone, gogs, nexus};
use crate::types::{Image, InstanceType, Vendor};

/// Categories of vendors the platform provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorCategory {
    /// Artifact repositories.
    Artifactory,
    /// Source-control managers.
    Scm,
    /// Continuous-integration servers.
    Ci,
}

/// The vendors available within a category, in catalog order.
#[must_use]
pub fn vendors_for(category: VendorCategory) -> Vec<Vendor> {
    match category {
        VendorCategory::Artifactory => vec![nexus::vendor()],
        VendorCategory::Scm => vec![gogs::vendor()],
        VendorCategory::Ci => vec![drone::vendor()],
    }
}

/// Whether `vendor` is a known vendor within `category`.
#[must_use]
pub fn is_valid_vendor(category: VendorCategory, vendor: &str) -> bool {
    vendors_for(category).iter().any(|v| v.name == vendor)
}

/// CMS server images available for deployment.
#[must_use]
pub fn cms_images() -> Vec<Image> {
    vec![Image::new("quarry/cms-danta:6.3-1.0.5-jdk8")]
}

/// Dispatcher images available for deployment.
#[must_use]
pub fn dispatcher_images() -> Vec<Image> {
    vec![Image::new("quarry/dispatcher:4.2.2")]
}

/// Instance types offered for deployment roles.
#[must_use]
pub fn instance_types() -> Vec<InstanceType> {
    ["small", "medium", "large"]
        .into_iter()
        .map(|name| InstanceType {
            name: name.to_owned(),
            description: format!("instance type {name}"),
        })
        .collect()
}
