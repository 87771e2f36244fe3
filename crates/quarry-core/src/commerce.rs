//! Commerce init-package catalog.
//!
//! Init packages are source archives stored in object storage that seed a
//! new commerce project. They do not change over time; when a new archive
//! is uploaded the catalog gains an entry here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extension version stamped into freshly generated projects.
pub const DEFAULT_EXTENSION_VERSION: &str = "0.0.0-SNAPSHOT";

const PACKAGES_BUCKET: &str = "quarry-ep-packages";

/// One known init package error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("not found init package '{0}' version")]
pub struct UnknownInitPackage(pub String);

/// An initial source package seeding a commerce project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPackage {
    /// Marketing version, e.g. "7.1".
    pub version: String,
    /// Platform version the package references in its build files.
    pub platform_version: String,
    /// Object-storage bucket holding the archive.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

/// The init packages available in object storage, in catalog order.
#[must_use]
pub fn init_packages() -> Vec<InitPackage> {
    vec![InitPackage {
        version: "7.1".to_owned(),
        platform_version: "701.0.0-SNAPSHOT".to_owned(),
        bucket: PACKAGES_BUCKET.to_owned(),
        key: "construction/EP-Commerce-7.1.0.zip".to_owned(),
    }]
}

/// Find an init package by exact version match.
pub fn find_init_package(version: &str) -> Result<InitPackage, UnknownInitPackage> {
    init_packages()
        .into_iter()
        .find(|p| p.version == version)
        .ok_or_else(|| UnknownInitPackage(version.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_version_resolves() {
        let p = find_init_package("7.1").unwrap();
        assert_eq!(p.platform_version, "701.0.0-SNAPSHOT");
        assert_eq!(p.bucket, "quarry-ep-packages");
    }

    #[test]
    fn unknown_version_is_an_error() {
        let err = find_init_package("9.9").unwrap_err();
        assert_eq!(err, UnknownInitPackage("9.9".to_owned()));
    }
}
