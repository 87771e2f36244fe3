//! Provisioning-layer configuration.
//!
//! Loaded from an optional TOML file merged with `QUARRY_CONTROL_*`
//! environment variables, so a deployment can override any single value
//! without shipping a file.

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use quarry_core::stack::StackSettings;
use serde::{Deserialize, Serialize};

use crate::error::ControlResult;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "quarry-control.toml";

/// Certificate-manager settings for per-client TLS certificates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateSettings {
    /// Cluster issuer handling the certificate request.
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// DNS challenge provider.
    #[serde(default = "default_dns_provider")]
    pub dns_provider: String,
}

fn default_issuer() -> String {
    "letsencrypt-prod-dns".to_owned()
}

fn default_dns_provider() -> String {
    "prod-dns".to_owned()
}

impl Default for CertificateSettings {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            dns_provider: default_dns_provider(),
        }
    }
}

/// Where the toolbelt box lives and how long its links last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbeltSettings {
    /// Bucket holding the toolbelt box.
    #[serde(default = "default_toolbelt_bucket")]
    pub bucket: String,
    /// Object key of the box within the bucket.
    #[serde(default = "default_toolbelt_key")]
    pub key: String,
    /// Signed-link lifetime in hours.
    #[serde(default = "default_toolbelt_expiry_hours")]
    pub expiry_hours: u64,
}

fn default_toolbelt_bucket() -> String {
    "quarry-boxes".to_owned()
}

fn default_toolbelt_key() -> String {
    "demo/boot2docker_virtualbox2.box".to_owned()
}

const fn default_toolbelt_expiry_hours() -> u64 {
    24
}

impl Default for ToolbeltSettings {
    fn default() -> Self {
        Self {
            bucket: default_toolbelt_bucket(),
            key: default_toolbelt_key(),
            expiry_hours: default_toolbelt_expiry_hours(),
        }
    }
}

/// Object-store region and endpoint the URL signer talks to.
/// Credentials come from the ambient environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSettings {
    /// Region of the buckets being signed for.
    #[serde(default = "default_region")]
    pub region: String,
    /// Custom endpoint, for non-AWS object stores.
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_owned()
}

impl Default for SignerSettings {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: None,
        }
    }
}

/// Top-level configuration for the provisioning layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Ambient settings for resource generators.
    #[serde(default)]
    pub stack: StackSettings,
    /// Per-client certificate settings.
    #[serde(default)]
    pub certificate: CertificateSettings,
    /// Toolbelt bundle settings.
    #[serde(default)]
    pub toolbelt: ToolbeltSettings,
    /// URL signer settings.
    #[serde(default)]
    pub signer: SignerSettings,
}

impl ControlConfig {
    /// Load configuration from `path` merged with the environment.
    pub fn load(path: &str) -> ControlResult<Self> {
        let config = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("QUARRY_CONTROL_").split("__"))
            .extract()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_apply_without_a_file() {
        let config = ControlConfig::load("missing.toml").unwrap();
        assert_eq!(config.certificate.issuer, "letsencrypt-prod-dns");
        assert_eq!(config.toolbelt.expiry_hours, 24);
        assert_eq!(config.stack.registry, "registry.local");
    }

    #[test]
    fn file_values_override_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "quarry-control.toml",
                r#"
                [stack]
                registry = "registry.example.com"
                external_domain = "stack.example.com"

                [certificate]
                issuer = "letsencrypt-staging"
                "#,
            )?;
            let config = ControlConfig::load(DEFAULT_CONFIG_PATH).unwrap();
            assert_eq!(config.stack.registry, "registry.example.com");
            assert_eq!(config.certificate.issuer, "letsencrypt-staging");
            assert_eq!(config.certificate.dns_provider, "prod-dns");
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        Jail::expect_with(|jail| {
            jail.set_env("QUARRY_CONTROL_TOOLBELT__BUCKET", "other-boxes");
            let config = ControlConfig::load("missing.toml").unwrap();
            assert_eq!(config.toolbelt.bucket, "other-boxes");
            Ok(())
        });
    }
}
