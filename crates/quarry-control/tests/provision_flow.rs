//! End-to-end provisioning flows against the in-memory collaborators.

use std::sync::Arc;

use quarry_cluster::{ClusterClient, MemoryCluster};
use quarry_control::{ControlConfig, Orchestrator, ProvisionOutcome, StaticSigner, UrlSigner};
use quarry_core::types::{Client, ClientConfiguration};
use quarry_secrets::{MemorySecrets, SecretStore};

struct Harness {
    cluster: Arc<MemoryCluster>,
    secrets: Arc<MemorySecrets>,
    signer: Arc<StaticSigner>,
    orchestrator: Orchestrator,
}

fn harness() -> Harness {
    let cluster = Arc::new(MemoryCluster::new());
    let secrets = Arc::new(MemorySecrets::new());
    let signer = Arc::new(StaticSigner::new());
    let orchestrator = Orchestrator::new(
        Arc::clone(&cluster) as Arc<dyn ClusterClient>,
        Arc::clone(&secrets) as Arc<dyn SecretStore>,
        Arc::clone(&signer) as Arc<dyn UrlSigner>,
        ControlConfig::default(),
    );
    Harness {
        cluster,
        secrets,
        signer,
        orchestrator,
    }
}

fn acme() -> Client {
    Client {
        client_id: "acme".to_owned(),
        custom_config: true,
        configuration: Some(ClientConfiguration {
            full_company_name: "Acme Inc".to_owned(),
            admin_email: "admin@acme.co".to_owned(),
            environments: vec!["dev".to_owned()],
            cms_instances_version: "6.3".to_owned(),
            cms_instances_type: "small".to_owned(),
            dispatcher_instances_version: "4.2.2".to_owned(),
            dispatcher_instances_type: "small".to_owned(),
            initial_repository_type: String::new(),
        }),
        ..Client::default()
    }
}

#[tokio::test]
async fn full_stack_is_provisioned_in_order() {
    let h = harness();
    let outcome = h.orchestrator.provision(acme()).await.unwrap();
    let ProvisionOutcome::FullDeployment(full) = outcome else {
        panic!("expected a full deployment");
    };

    // namespace and certificate
    h.cluster.get_namespace("acme").await.unwrap();

    // one content-management deployment per environment
    let deployment = h.cluster.get_cms_deployment("acme", "dev").await.unwrap();
    assert_eq!(deployment.spec.version, "6.3");
    assert_eq!(deployment.spec.authors.replicas, 1);

    // artifactory resources plus its init secret and job
    h.cluster.get_workload("acme", "nexus-server").await.unwrap();
    h.cluster.get_service("acme", "nexus-srvc").await.unwrap();
    h.cluster.get_route("acme", "nexus-ingress").await.unwrap();
    h.cluster.get_secret("acme", "nexus-init-config").await.unwrap();
    assert_eq!(full.artifactory.host, "https://nexus-server-acme.quarry.local");

    // scm resources; the ci server is wired to the scm host
    h.cluster.get_workload("acme", "gogs-server").await.unwrap();
    assert_eq!(full.scm.host, "https://gogs-server-acme.quarry.local");
    assert_eq!(full.ci.scm_url, full.scm.host);
    let drone = h.cluster.get_workload("acme", "drone-server").await.unwrap();
    assert!(drone.containers[0]
        .env
        .iter()
        .any(|e| e.name == "DRONE_GOGS_URL" && e.value == full.scm.host));

    // toolbelt persisted with a signed link
    let toolbelt = h.cluster.get_secret("acme", "toolbelt").await.unwrap();
    assert!(toolbelt.data.contains_key("url"));
    assert!(full.toolbelt.url.contains("quarry-boxes"));
}

#[tokio::test]
async fn dry_run_returns_the_plan_without_any_collaborator_call() {
    let h = harness();
    let mut client = acme();
    client.dry_run = true;

    let outcome = h.orchestrator.provision(client).await.unwrap();
    let ProvisionOutcome::FullDeployment(full) = outcome else {
        panic!("expected a full deployment plan");
    };

    assert_eq!(full.cms_deployments.len(), 1);
    assert_eq!(
        full.artifactory.configuration.as_ref().unwrap().hosteds[0].name,
        "acme-releases"
    );
    assert_eq!(h.cluster.operation_count(), 0);
    assert_eq!(h.signer.call_count(), 0);
}

#[tokio::test]
async fn dry_run_without_custom_config_is_rejected() {
    let h = harness();
    let client = Client {
        client_id: "acme".to_owned(),
        dry_run: true,
        ..Client::default()
    };
    let err = h.orchestrator.provision(client).await.unwrap_err();
    assert_eq!(err.to_string(), "dryRun only available with customConfig");
    assert_eq!(h.cluster.operation_count(), 0);
}

#[tokio::test]
async fn invalid_configuration_is_rejected_before_any_call() {
    let h = harness();
    let mut client = acme();
    client
        .configuration
        .as_mut()
        .unwrap()
        .environments
        .clear();
    let err = h.orchestrator.provision(client).await.unwrap_err();
    assert_eq!(err.to_string(), "environments are required, minimum 1");
    assert_eq!(h.cluster.operation_count(), 0);
}

#[tokio::test]
async fn bare_client_creates_namespace_and_certificate_only() {
    let h = harness();
    let client = Client {
        client_id: "acme".to_owned(),
        metadata: [("company".to_owned(), "Acme Inc".to_owned())].into(),
        ..Client::default()
    };
    let outcome = h.orchestrator.provision(client).await.unwrap();
    assert!(matches!(outcome, ProvisionOutcome::Client(_)));

    let namespace = h.cluster.get_namespace("acme").await.unwrap();
    assert_eq!(namespace.annotations.get("company").unwrap(), "Acme Inc");
    // namespace create + certificate create
    assert_eq!(h.cluster.operation_count(), 3);
}

#[tokio::test]
async fn provisioning_the_same_client_twice_reports_already_exists() {
    let h = harness();
    h.orchestrator.provision(acme()).await.unwrap();
    let err = h.orchestrator.provision(acme()).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn clients_are_listed_from_namespaces() {
    let h = harness();
    h.orchestrator.provision(acme()).await.unwrap();
    let clients = h.orchestrator.list_clients().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].client_id, "acme");

    let fetched = h.orchestrator.get_client("acme").await.unwrap();
    assert_eq!(fetched.client_id, "acme");
}

#[tokio::test]
async fn deprovision_cascades_and_cleans_stored_credentials() {
    let h = harness();
    h.orchestrator.provision(acme()).await.unwrap();

    let mut value = quarry_secrets::SecretMap::new();
    value.insert("password".to_owned(), "s3cret".to_owned());
    h.secrets
        .put("secret/acme/dev/author-0", value)
        .await
        .unwrap();

    h.orchestrator.deprovision("acme").await.unwrap();
    assert!(h.cluster.get_namespace("acme").await.is_err());
    assert!(h.cluster.get_workload("acme", "nexus-server").await.is_err());
    let remaining = h.secrets.get("secret/acme/dev/author-0").await.unwrap();
    assert!(remaining.is_empty());
}
