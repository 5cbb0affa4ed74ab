//! Shared fixtures for reconcile engine tests: a scripted in-memory cloud, a connector that
//! hands out clients for it, and record builders.

#![allow(dead_code, reason = "Not every test binary uses every fixture")]

use async_trait::async_trait;
use cloud_resource_controller::controller::reconciler::{ReconcileEngine, RequeueTiming};
use cloud_resource_controller::provider::{
    ConnectError, ConnectionAttributes, Connector, ExternalError, ExternalHandle,
    ExternalResourceClient, ObservedResource,
};
use cloud_resource_controller::publisher::{ConnectionPublisher, InMemorySecretStore};
use cloud_resource_controller::store::{InMemoryRecordStore, RecordKey};
use cloud_resource_controller::{
    CloudsqlInstance, GkeCluster, ManagedResource, ProviderRef, ResourceStatus,
};
use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const POST_CREATE: Duration = Duration::from_secs(30);
pub const POLL: Duration = Duration::from_secs(10);

/// Scripted external system shared by every client the connector hands out
#[derive(Debug, Default)]
pub struct FakeCloud {
    inner: Mutex<CloudState>,
}

#[derive(Debug, Default)]
struct CloudState {
    resources: BTreeSet<String>,
    state: String,
    ready_state: String,
    create_error: Option<ExternalError>,
    get_error: Option<ExternalError>,
    delete_error: Option<ExternalError>,
    connect_error: bool,
    creates: u32,
    gets: u32,
    deletes: u32,
}

impl FakeCloud {
    pub fn new(ready_state: &str) -> Arc<Self> {
        let cloud = Self::default();
        {
            let mut state = cloud.inner.lock().unwrap();
            state.ready_state = ready_state.to_string();
            state.state = "PROVISIONING".to_string();
        }
        Arc::new(cloud)
    }

    /// External lifecycle state reported by `get`
    pub fn set_state(&self, state: &str) {
        self.inner.lock().unwrap().state = state.to_string();
    }

    pub fn become_ready(&self) {
        let mut state = self.inner.lock().unwrap();
        state.state = state.ready_state.clone();
    }

    pub fn fail_create(&self, error: Option<ExternalError>) {
        self.inner.lock().unwrap().create_error = error;
    }

    pub fn fail_get(&self, error: Option<ExternalError>) {
        self.inner.lock().unwrap().get_error = error;
    }

    pub fn fail_delete(&self, error: Option<ExternalError>) {
        self.inner.lock().unwrap().delete_error = error;
    }

    pub fn fail_connect(&self, fail: bool) {
        self.inner.lock().unwrap().connect_error = fail;
    }

    /// Pretend an earlier attempt already created `name`
    pub fn preexisting(&self, name: &str) {
        self.inner.lock().unwrap().resources.insert(name.to_string());
    }

    pub fn exists(&self, name: &str) -> bool {
        self.inner.lock().unwrap().resources.contains(name)
    }

    pub fn creates(&self) -> u32 {
        self.inner.lock().unwrap().creates
    }

    pub fn gets(&self) -> u32 {
        self.inner.lock().unwrap().gets
    }

    pub fn deletes(&self) -> u32 {
        self.inner.lock().unwrap().deletes
    }
}

pub struct FakeClient<S> {
    cloud: Arc<FakeCloud>,
    _spec: PhantomData<fn() -> S>,
}

#[async_trait]
impl<S: Send + Sync + 'static> ExternalResourceClient for FakeClient<S> {
    type Spec = S;

    async fn create(&self, name: &str, _spec: &S) -> Result<ExternalHandle, ExternalError> {
        let mut state = self.cloud.inner.lock().unwrap();
        state.creates += 1;
        if let Some(error) = state.create_error.clone() {
            return Err(error);
        }
        if !state.resources.insert(name.to_string()) {
            return Err(ExternalError::AlreadyExists(name.to_string()));
        }
        Ok(ExternalHandle {
            name: name.to_string(),
            operation: Some(format!("operation-{name}")),
        })
    }

    async fn get(&self, location: &str, name: &str) -> Result<ObservedResource, ExternalError> {
        let mut state = self.cloud.inner.lock().unwrap();
        state.gets += 1;
        if let Some(error) = state.get_error.clone() {
            return Err(error);
        }
        if !state.resources.contains(name) {
            return Err(ExternalError::NotFound(name.to_string()));
        }
        Ok(ObservedResource {
            state: state.state.clone(),
            ready: state.state == state.ready_state,
            provider_id: format!("https://example.test/{location}/{name}"),
            connection: ConnectionAttributes {
                endpoint: "35.0.0.1".to_string(),
                username: "admin".to_string(),
                password: "s3cret".to_string(),
                ca_certificate: "CA".to_string(),
                client_certificate: "CERT".to_string(),
                client_key: "KEY".to_string(),
            },
        })
    }

    async fn delete(&self, _location: &str, name: &str) -> Result<(), ExternalError> {
        let mut state = self.cloud.inner.lock().unwrap();
        state.deletes += 1;
        if let Some(error) = state.delete_error.clone() {
            return Err(error);
        }
        if state.resources.remove(name) {
            Ok(())
        } else {
            Err(ExternalError::NotFound(name.to_string()))
        }
    }
}

pub struct FakeConnector {
    cloud: Arc<FakeCloud>,
}

#[async_trait]
impl<S: Send + Sync + 'static> Connector<S> for FakeConnector {
    async fn connect(
        &self,
        _namespace: &str,
        provider: &ProviderRef,
    ) -> Result<Box<dyn ExternalResourceClient<Spec = S>>, ConnectError> {
        if self.cloud.inner.lock().unwrap().connect_error {
            return Err(ConnectError::ProviderNotFound(provider.name.clone()));
        }
        Ok(Box::new(FakeClient {
            cloud: Arc::clone(&self.cloud),
            _spec: PhantomData,
        }))
    }
}

/// Engine wired to in-memory stores and a fake cloud
pub struct Harness<K: ManagedResource> {
    pub store: Arc<InMemoryRecordStore<K>>,
    pub secrets: Arc<InMemorySecretStore>,
    pub cloud: Arc<FakeCloud>,
    pub engine: ReconcileEngine<K>,
    pub key: RecordKey,
}

impl<K: ManagedResource> Harness<K> {
    pub fn new(record: K, ready_state: &str) -> Self {
        let store = Arc::new(InMemoryRecordStore::new());
        let secrets = Arc::new(InMemorySecretStore::new());
        let cloud = FakeCloud::new(ready_state);
        let engine = ReconcileEngine::new(
            store.clone(),
            Arc::new(FakeConnector {
                cloud: Arc::clone(&cloud),
            }),
            ConnectionPublisher::new(secrets.clone()),
            RequeueTiming {
                post_create: POST_CREATE,
                poll: POLL,
            },
        );
        let stored = store.insert(record);
        let key = RecordKey::from_resource(&stored);
        Self {
            store,
            secrets,
            cloud,
            engine,
            key,
        }
    }

    pub fn record(&self) -> Option<K> {
        self.store.snapshot(&self.key)
    }

    pub fn status(&self) -> ResourceStatus {
        self.record()
            .and_then(|r| r.status().cloned())
            .unwrap_or_default()
    }

    pub fn external_name(&self) -> String {
        self.status().external_name
    }

    /// Type of the single active condition, if any
    pub fn condition(&self) -> Option<String> {
        let status = self.status();
        assert!(
            status.conditions.len() <= 1,
            "more than one condition present: {:?}",
            status.conditions
        );
        status.conditions.first().map(|c| c.r#type.clone())
    }

    pub fn condition_reason(&self) -> Option<String> {
        self.status()
            .conditions
            .first()
            .and_then(|c| c.reason.clone())
    }

    pub fn resource_version(&self) -> Option<String> {
        self.record().and_then(|r| r.meta().resource_version.clone())
    }

    pub fn has_finalizer(&self) -> bool {
        self.record().is_some_and(|r| {
            r.meta()
                .finalizers
                .as_ref()
                .is_some_and(|f| f.iter().any(|t| t == K::FINALIZER))
        })
    }
}

pub fn gke_cluster(name: &str, reclaim_policy: &str) -> GkeCluster {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "gcp.cloud-resources.microscaler.io/v1alpha1",
        "kind": "GkeCluster",
        "metadata": { "name": name, "namespace": "default" },
        "spec": {
            "providerRef": { "name": "gcp-provider" },
            "zone": "us-central1-a",
            "reclaimPolicy": reclaim_policy
        }
    }))
    .unwrap()
}

pub fn cloudsql_instance(name: &str) -> CloudsqlInstance {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "gcp.cloud-resources.microscaler.io/v1alpha1",
        "kind": "CloudsqlInstance",
        "metadata": { "name": name, "namespace": "shop" },
        "spec": {
            "providerRef": { "name": "gcp-provider" },
            "region": "us-central1",
            "databaseVersion": "POSTGRES_9_6",
            "reclaimPolicy": "Delete"
        }
    }))
    .unwrap()
}
