//! Domain entities exchanged with callers.
//!
//! All of these serialize to the JSON wire shapes the provisioning API
//! speaks; field renames pin the exact wire names where they differ from
//! Rust convention.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A client of the platform, isolated in its own namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Namespace where the client's resources live. Immutable and
    /// globally unique among clients.
    pub client_id: String,
    /// Additional client information, stored as namespace annotations.
    #[serde(rename = "meta", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Whether the request carries a full custom configuration.
    #[serde(default)]
    pub custom_config: bool,
    /// Required when `custom_config` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ClientConfiguration>,
    /// Return the expanded [`FullDeployment`] without creating anything.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

/// The information needed to expand a client request into a full stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfiguration {
    /// Legal company name, used for the source-control organization.
    pub full_company_name: String,
    /// Administrator contact email.
    pub admin_email: String,
    /// Target environments, one content-management deployment each.
    pub environments: Vec<String>,
    /// Content-management software version, e.g. "6.3".
    #[serde(rename = "aemInstancesVersion")]
    pub cms_instances_version: String,
    /// Content-management instance type, e.g. "small".
    #[serde(rename = "aemInstancesType")]
    pub cms_instances_type: String,
    /// Companion dispatcher process version.
    pub dispatcher_instances_version: String,
    /// Dispatcher instance type.
    pub dispatcher_instances_type: String,
    /// Content-setup template for the initial repository; see
    /// [`ScmRepository::content_setup_type`].
    #[serde(default)]
    pub initial_repository_type: String,
}

/// The aggregate of every resource provisioned for one client in one
/// request. Built in memory per request; never independently persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullDeployment {
    /// The client the stack belongs to.
    pub client: Client,
    /// One content-management deployment per requested environment.
    pub cms_deployments: Vec<CmsDeployment>,
    /// The artifact-repository instance.
    pub artifactory: Artifactory,
    /// The source-control instance.
    pub scm: Scm,
    /// The continuous-integration instance.
    pub ci: Ci,
    /// The credential bundle.
    pub toolbelt: Toolbelt,
}

/// A content-management deployment, keyed by (client, environment).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmsDeployment {
    /// Namespace hosting the deployment.
    pub client_id: String,
    /// Environment identifier; also the deployment's name.
    pub environment_id: String,
    /// Desired configuration.
    #[serde(default)]
    pub spec: CmsSpec,
    /// Phase of the underlying workload, mirrored verbatim.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
}

/// Desired configuration of a content-management deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsSpec {
    /// Author role sizing.
    #[serde(default)]
    pub authors: RoleConfig,
    /// Publisher role sizing.
    #[serde(default)]
    pub publishers: RoleConfig,
    /// Dispatcher role sizing.
    #[serde(default)]
    pub dispatchers: RoleConfig,
    /// Software version, e.g. "6.3".
    pub version: String,
    /// Dispatcher process version, e.g. "4.2.2".
    #[serde(rename = "dispatcher_version")]
    pub dispatcher_version: String,
}

/// Instance sizing for one deployment role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Instance type, e.g. "small".
    #[serde(rename = "type")]
    pub instance_type: String,
    /// Replica count.
    pub replicas: i32,
}

/// An artifact-repository instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifactory {
    /// Chosen vendor identifier, e.g. "nexus".
    pub artifactory_id: String,
    /// Workload name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    /// External route name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub route_name: String,
    /// Image to deploy, from the vendor's image list.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Network service name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    /// Externally reachable host, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    /// Whether an initialization job configures the server.
    #[serde(default)]
    pub custom_config: bool,
    /// Required when `custom_config` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ArtifactoryConfig>,
}

/// Initialization payload applied to an artifact repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactoryConfig {
    /// User accounts to create or change.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<ArtifactoryUser>,
    /// Group repositories to create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<ArtifactoryGroup>,
    /// Hosted repositories to create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosteds: Vec<ArtifactoryHosted>,
    /// Proxy repositories to create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub proxies: Vec<ArtifactoryProxy>,
}

impl ArtifactoryConfig {
    /// Number of configuration operations carried by this payload.
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.users.len() + self.groups.len() + self.hosteds.len() + self.proxies.len()
    }
}

/// A user account in the artifact repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactoryUser {
    /// Action for this user: CHANGE or CREATE.
    pub action: String,
    /// Account name.
    pub username: String,
    /// Current password.
    pub password: String,
    /// New password, for CHANGE.
    #[serde(rename = "newpassword", default, skip_serializing_if = "String::is_empty")]
    pub new_password: String,
}

/// A group repository aggregating other repositories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactoryGroup {
    /// Group name.
    pub name: String,
    /// Member repository names.
    pub members: Vec<String>,
}

/// A hosted repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactoryHosted {
    /// Repository name.
    pub name: String,
    /// RELEASE, SNAPSHOT or MIXED.
    pub version_policy: String,
    /// STRICT or PERMISSIVE.
    pub layout_policy: String,
}

/// A proxy repository for an upstream remote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactoryProxy {
    /// Repository name.
    pub name: String,
    /// RELEASE, SNAPSHOT or MIXED.
    pub version_policy: String,
    /// STRICT or PERMISSIVE.
    pub layout_policy: String,
    /// Upstream URL to proxy.
    pub remote_url: String,
    /// Whether the upstream requires authentication.
    #[serde(default)]
    pub required_auth: bool,
    /// Required when `required_auth` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<ArtifactoryAuth>,
}

/// Credentials for an authenticated proxy upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactoryAuth {
    /// Upstream account name.
    pub username: String,
    /// Upstream password.
    pub password: String,
}

/// A source-control server instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scm {
    /// Chosen vendor identifier, e.g. "gogs".
    pub scm_id: String,
    /// Workload name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    /// External route name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub route_name: String,
    /// Image to deploy.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Network service name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    /// Externally reachable host, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    /// Whether an initialization job configures the server.
    #[serde(default)]
    pub custom_config: bool,
    /// Required when `custom_config` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ScmConfig>,
}

/// Initialization payload applied to a source-control server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmConfig {
    /// Initial server setup; required.
    pub init_data: Option<ScmInitData>,
    /// Organizations to create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub organizations: Vec<ScmOrganization>,
    /// Repositories to create.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<ScmRepository>,
}

/// First-boot configuration for the source-control server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmInitData {
    /// External domain of the server; filled by the controller.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    /// HTTP port the server listens on; filled by the controller.
    #[serde(rename = "http_port", default, skip_serializing_if = "String::is_empty")]
    pub http_port: String,
    /// Full application URL; filled by the controller.
    #[serde(rename = "app_url", default, skip_serializing_if = "String::is_empty")]
    pub app_url: String,
    /// Administrator account name. Must not be the reserved "admin".
    #[serde(rename = "admin_name")]
    pub admin_name: String,
    /// Administrator password.
    #[serde(rename = "admin_passwd")]
    pub admin_password: String,
    /// Password confirmation.
    #[serde(rename = "admin_confirm_passwd")]
    pub admin_confirm_password: String,
    /// Administrator email.
    #[serde(rename = "admin_email")]
    pub admin_email: String,
    /// Repository storage path; filled by the controller.
    #[serde(rename = "repo_root_path", default, skip_serializing_if = "String::is_empty")]
    pub repo_root_path: String,
    /// Log path; filled by the controller.
    #[serde(rename = "log_root_path", default, skip_serializing_if = "String::is_empty")]
    pub log_root_path: String,
}

/// An organization in the source-control server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmOrganization {
    /// Organization account name.
    pub username: String,
    /// Display name.
    #[serde(rename = "full_name", default, skip_serializing_if = "String::is_empty")]
    pub full_name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Website URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub website: String,
    /// Location.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
}

/// Content-setup type seeding an EP commerce project.
pub const CONTENT_SETUP_EP_COMMERCE: &str = "ep-commerce";
/// Content-setup type generating a Bloomreach archetype project.
pub const CONTENT_SETUP_BLOOMREACH: &str = "bloomreach-archetype";

/// A repository in the source-control server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScmRepository {
    /// Repository name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Whether the repository is private.
    #[serde(default)]
    pub private: bool,
    /// Owning organization or user.
    pub owner: String,
    /// Initial content template: "danta-aem-demo", "ep-commerce",
    /// "bloomreach-archetype" or empty for no seeding.
    #[serde(rename = "content_setup_type", default, skip_serializing_if = "String::is_empty")]
    pub content_setup_type: String,
    /// Required when `content_setup_type` is "ep-commerce".
    #[serde(rename = "ep_commerce", default, skip_serializing_if = "Option::is_none")]
    pub ep_commerce: Option<EpProject>,
    /// Required when `content_setup_type` is "bloomreach-archetype".
    #[serde(
        rename = "bloomreach_archetype",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bloomreach_archetype: Option<BloomreachArchetype>,
}

/// EP commerce seed-project parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpProject {
    /// EP version, e.g. "7.1". Selects the init package.
    pub version: String,
    /// Signed download URL for the init package; generated.
    #[serde(rename = "source_code_url", default, skip_serializing_if = "String::is_empty")]
    pub source_code_url: String,
    /// Repository-group URL the build resolves against.
    #[serde(rename = "maven_rep_url", default, skip_serializing_if = "String::is_empty")]
    pub maven_repo_url: String,
    /// EP version carried by the init package's build files; generated.
    #[serde(rename = "platform_version", default, skip_serializing_if = "String::is_empty")]
    pub platform_version: String,
    /// New project version; defaults to "0.0.0-SNAPSHOT".
    #[serde(rename = "extension_version", default, skip_serializing_if = "String::is_empty")]
    pub extension_version: String,
}

/// Bloomreach archetype parameters; all fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloomreachArchetype {
    /// Archetype version, e.g. "12.2.0".
    #[serde(rename = "archetype_version")]
    pub archetype_version: String,
    /// Group identifier, e.g. "org.example".
    #[serde(rename = "group_id")]
    pub group_id: String,
    /// Artifact identifier.
    #[serde(rename = "artifact_id")]
    pub artifact_id: String,
    /// Project version, e.g. "0.1.0-SNAPSHOT".
    pub version: String,
    /// Java package.
    pub package: String,
    /// Project name.
    #[serde(rename = "project_name")]
    pub project_name: String,
}

/// A continuous-integration server instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ci {
    /// Chosen vendor identifier, e.g. "drone".
    pub ci_id: String,
    /// Workload name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_name: String,
    /// External route name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub route_name: String,
    /// Server image to deploy.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    /// Agent image to deploy.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub second_image: String,
    /// Network service name, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    /// Externally reachable host, populated after creation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,
    /// Upstream source-control URL the CI server watches.
    #[serde(rename = "scmURL", default, skip_serializing_if = "String::is_empty")]
    pub scm_url: String,
}

/// A credential bundle: a time-boxed signed download link plus metadata,
/// regenerated on every creation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toolbelt {
    /// Owning client.
    pub client_id: String,
    /// Signed download URL.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
    /// Human-readable expiry message.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// A vendor implementing one resource category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    /// Vendor name, e.g. "nexus".
    pub name: String,
    /// Images available for this vendor, in catalog order.
    pub images: Vec<Image>,
}

/// An image reference offered by a vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image and tag, e.g. "quarry/nexus:3.8.0".
    pub name: String,
    /// Companion image, for vendors that deploy two processes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl Image {
    /// A plain image entry without a companion.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secondary: None,
        }
    }

    /// An image entry paired with a companion image.
    #[must_use]
    pub fn with_secondary(name: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            secondary: Some(secondary.into()),
        }
    }
}

/// An instance type offered for deployment roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceType {
    /// Type name, e.g. "small".
    pub name: String,
    /// Description for display.
    pub description: String,
}

/// A target environment, named after its deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSummary {
    /// Environment identifier.
    pub environment_id: String,
}

/// A member process of a content-management deployment, with derived
/// health flags and its generated credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceStatus {
    /// Process name.
    pub name: String,
    /// Owning namespace.
    pub account: String,
    /// Environment the process belongs to.
    pub environment: String,
    /// Role label, e.g. "author".
    pub runmode: String,
    /// Observed phase is "Running".
    pub running: bool,
    /// Latest readiness condition is true.
    pub ready: bool,
    /// Generated credential from the secret store, if any.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
}

/// Dispatcher configuration for one environment, backed by a config map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatcherConfig {
    /// Owning client.
    pub client_id: String,
    /// Environment the configuration applies to.
    pub environment_id: String,
    /// Config map name.
    pub name: String,
    /// Configuration payload.
    #[serde(default)]
    pub data: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_wire_shape() {
        let json = r#"{
            "clientId": "acme",
            "customConfig": true,
            "dryRun": true,
            "configuration": {
                "fullCompanyName": "Acme Inc",
                "adminEmail": "a@acme.co",
                "environments": ["dev"],
                "aemInstancesType": "small",
                "aemInstancesVersion": "6.3",
                "dispatcherInstancesType": "small",
                "dispatcherInstancesVersion": "4.2.2"
            }
        }"#;

        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.client_id, "acme");
        assert!(client.custom_config);
        assert!(client.dry_run);

        let configuration = client.configuration.unwrap();
        assert_eq!(configuration.cms_instances_version, "6.3");
        assert_eq!(configuration.dispatcher_instances_type, "small");
        assert_eq!(configuration.environments, vec!["dev".to_owned()]);
    }

    #[test]
    fn ci_scm_url_field_name() {
        let ci = Ci {
            ci_id: "drone".to_owned(),
            scm_url: "https://gogs-acme.example.com".to_owned(),
            ..Ci::default()
        };
        let json = serde_json::to_value(&ci).unwrap();
        assert_eq!(json["scmURL"], "https://gogs-acme.example.com");
    }

    #[test]
    fn cms_spec_wire_shape() {
        let json = r#"{
            "authors": {"type": "small", "replicas": 1},
            "publishers": {"type": "small", "replicas": 1},
            "dispatchers": {"type": "small", "replicas": 1},
            "version": "6.3",
            "dispatcher_version": "4.2.2"
        }"#;
        let spec: CmsSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.authors.instance_type, "small");
        assert_eq!(spec.dispatcher_version, "4.2.2");
    }

    #[test]
    fn artifactory_config_operation_count() {
        let config = ArtifactoryConfig {
            hosteds: vec![ArtifactoryHosted {
                name: "acme-releases".to_owned(),
                version_policy: "RELEASE".to_owned(),
                layout_policy: "STRICT".to_owned(),
            }],
            ..ArtifactoryConfig::default()
        };
        assert_eq!(config.operation_count(), 1);
        assert_eq!(ArtifactoryConfig::default().operation_count(), 0);
    }
}
