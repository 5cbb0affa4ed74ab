//! Reconcile engine scenarios against an in-memory record store and a scripted cloud.

mod common;

use cloud_resource_controller::controller::reconciler::ReconcileOutcome;
use cloud_resource_controller::provider::ExternalError;
use cloud_resource_controller::store::RecordKey;
use cloud_resource_controller::ManagedResource;
use common::{cloudsql_instance, gke_cluster, Harness, POLL, POST_CREATE};

#[tokio::test]
async fn test_cluster_is_created_polled_and_published() {
    let h = Harness::new(gke_cluster("staging", "Retain"), "RUNNING");
    let uid = h.record().unwrap().metadata.uid.unwrap();

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POST_CREATE));
    assert_eq!(h.external_name(), format!("gke-{uid}"));
    assert_eq!(h.condition().as_deref(), Some("Creating"));
    assert!(h.has_finalizer());
    assert_eq!(h.cloud.creates(), 1);

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POLL));
    assert_eq!(h.status().state, "PROVISIONING");
    assert_eq!(h.condition().as_deref(), Some("Creating"));
    assert!(h.status().connection_secret_ref.is_none());
    assert!(h.secrets.is_empty());

    h.cloud.become_ready();
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Done);

    let status = h.status();
    assert_eq!(h.condition().as_deref(), Some("Ready"));
    assert_eq!(status.state, "RUNNING");
    assert_eq!(status.message, format!("GKE cluster gke-{uid} is running"));
    assert_eq!(
        status.provider_resource_id,
        format!("https://example.test/us-central1-a/gke-{uid}")
    );
    let secret_ref = status.connection_secret_ref.unwrap();
    assert_eq!(secret_ref.name, "staging");
    assert_eq!(secret_ref.namespace, "default");

    let secret = h.secrets.get("default", "staging").unwrap();
    assert_eq!(secret.data["endpoint"], b"35.0.0.1".to_vec());
    assert_eq!(secret.data["password"], b"s3cret".to_vec());
    assert_eq!(secret.owner.unwrap().uid, uid);
    assert_eq!(h.cloud.creates(), 1);
}

#[tokio::test]
async fn test_ready_record_is_not_rewritten() {
    let h = Harness::new(gke_cluster("steady", "Retain"), "RUNNING");
    h.engine.reconcile(&h.key).await.unwrap();
    h.cloud.become_ready();
    h.engine.reconcile(&h.key).await.unwrap();
    let version = h.resource_version();
    let status = h.status();

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(h.resource_version(), version);
    assert_eq!(h.status(), status);
    assert_eq!(h.secrets.len(), 1);
}

#[tokio::test]
async fn test_absent_record_is_done() {
    let h = Harness::new(gke_cluster("present", "Retain"), "RUNNING");
    let missing = RecordKey::new("default", "missing");

    let outcome = h.engine.reconcile(&missing).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(h.cloud.creates(), 0);
}

#[tokio::test]
async fn test_existing_resource_from_earlier_attempt_is_adopted() {
    let h = Harness::new(gke_cluster("adopted", "Retain"), "RUNNING");
    let name = h.record().unwrap().derive_external_name();
    h.cloud.preexisting(&name);

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POST_CREATE));
    assert_eq!(h.external_name(), name);
    assert_eq!(h.condition().as_deref(), Some("Creating"));

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POLL));
    assert_eq!(h.cloud.creates(), 1);
    assert_eq!(h.cloud.gets(), 1);
}

#[tokio::test]
async fn test_bad_request_fails_without_retry() {
    let h = Harness::new(gke_cluster("invalid", "Retain"), "RUNNING");
    h.cloud
        .fail_create(Some(ExternalError::BadRequest("invalid machine type".to_string())));

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(h.condition().as_deref(), Some("Failed"));
    assert_eq!(h.condition_reason().as_deref(), Some("CreateFailed"));
    assert_eq!(h.status().message, "bad request: invalid machine type");
    assert!(h.external_name().is_empty());
}

#[tokio::test]
async fn test_transient_create_error_is_retried() {
    let h = Harness::new(gke_cluster("flaky", "Retain"), "RUNNING");
    h.cloud
        .fail_create(Some(ExternalError::Transient("backend unavailable".to_string())));

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Retry);
    assert_eq!(h.condition_reason().as_deref(), Some("CreateFailed"));
    assert!(h.external_name().is_empty());

    h.cloud.fail_create(None);
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POST_CREATE));
    assert_eq!(h.condition().as_deref(), Some("Creating"));
    assert_eq!(h.cloud.creates(), 2);
}

#[tokio::test]
async fn test_connect_failure_is_recorded() {
    let h = Harness::new(gke_cluster("orphan", "Retain"), "RUNNING");
    h.cloud.fail_connect(true);

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Retry);
    assert_eq!(h.condition().as_deref(), Some("Failed"));
    assert_eq!(h.condition_reason().as_deref(), Some("ClientConnectionFailed"));
    assert_eq!(h.status().message, "provider gcp-provider not found");
    assert!(!h.has_finalizer());
    assert_eq!(h.cloud.creates(), 0);
}

#[tokio::test]
async fn test_failed_poll_recovers_to_creating() {
    let h = Harness::new(gke_cluster("recovering", "Retain"), "RUNNING");
    h.engine.reconcile(&h.key).await.unwrap();
    let name = h.external_name();

    h.cloud
        .fail_get(Some(ExternalError::Transient("deadline exceeded".to_string())));
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Retry);
    assert_eq!(h.condition_reason().as_deref(), Some("SyncFailed"));
    assert_eq!(h.external_name(), name);

    h.cloud.fail_get(None);
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POLL));
    assert_eq!(h.condition().as_deref(), Some("Creating"));
    assert_eq!(h.cloud.creates(), 1);
}

#[tokio::test]
async fn test_publish_failure_is_retried() {
    let h = Harness::new(gke_cluster("locked", "Retain"), "RUNNING");
    h.engine.reconcile(&h.key).await.unwrap();
    h.cloud.become_ready();
    h.secrets.set_failing(true);

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Retry);
    assert_eq!(h.condition_reason().as_deref(), Some("ConnectionSecretFailed"));
    assert!(h.status().connection_secret_ref.is_none());

    h.secrets.set_failing(false);
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(h.condition().as_deref(), Some("Ready"));
    assert!(h.status().connection_secret_ref.is_some());
}

#[tokio::test]
async fn test_ready_resource_leaving_usable_state_drops_secret_ref() {
    let h = Harness::new(gke_cluster("upgrading", "Retain"), "RUNNING");
    h.engine.reconcile(&h.key).await.unwrap();
    h.cloud.become_ready();
    h.engine.reconcile(&h.key).await.unwrap();

    h.cloud.set_state("RECONCILING");
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POLL));
    assert_eq!(h.status().state, "RECONCILING");
    assert!(h.status().connection_secret_ref.is_none());
    assert_eq!(h.condition().as_deref(), Some("Ready"));
}

#[tokio::test]
async fn test_cloudsql_instance_lifecycle() {
    let h = Harness::new(cloudsql_instance("orders-db"), "RUNNABLE");
    let uid = h.record().unwrap().metadata.uid.unwrap();

    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::RetryAfter(POST_CREATE));
    assert_eq!(h.external_name(), format!("orders-db-{uid}"));

    h.cloud.become_ready();
    let outcome = h.engine.reconcile(&h.key).await.unwrap();
    assert_eq!(outcome, ReconcileOutcome::Done);
    assert_eq!(
        h.status().message,
        format!("Cloud SQL instance orders-db-{uid} is running")
    );

    let secret_ref = h.status().connection_secret_ref.unwrap();
    assert_eq!(secret_ref.namespace, "shop");
    assert_eq!(secret_ref.name, "orders-db");
    assert!(h.secrets.get("shop", "orders-db").is_some());
}
