//! Resource name derivation.
//!
//! Every resource a vendor needs is named by a fixed derivation over the
//! vendor name, so only one instance of each vendor may exist per
//! namespace at a time. Deriving (rather than hardcoding) keeps the door
//! open for multiple instances per category later without changing the
//! contract.

/// The stable set of resource names for one vendor within a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorNames {
    /// Stateful workload name.
    pub workload: String,
    /// Network service name.
    pub service: String,
    /// External route name.
    pub route: String,
    /// One-shot initialization job name.
    pub init_job: String,
    /// Initialization config secret name.
    pub init_secret: String,
}

impl VendorNames {
    /// Derive the resource names for a vendor.
    #[must_use]
    pub fn new(vendor: &str) -> Self {
        Self {
            workload: format!("{vendor}-server"),
            service: format!("{vendor}-srvc"),
            route: format!("{vendor}-ingress"),
            init_job: format!("{vendor}-init-job"),
            init_secret: format!("{vendor}-init-config"),
        }
    }

    /// The external host for this vendor in a namespace, under the
    /// platform domain.
    #[must_use]
    pub fn external_host(&self, namespace: &str, domain: &str) -> String {
        format!("{}-{}.{}", self.workload, namespace, domain)
    }
}

/// Name of the TLS secret shared by every route in a namespace.
#[must_use]
pub fn tls_secret_name(namespace: &str) -> String {
    format!("{namespace}-public-tls")
}

/// Name of the per-namespace certificate request.
#[must_use]
pub fn certificate_name(namespace: &str) -> String {
    format!("{namespace}-account-certificate")
}
