//! Record store backed by the Kubernetes API.
//!
//! Writes are JSON merge patches that include `metadata.resourceVersion`, which makes the
//! API server reject them with 409 when the record changed since it was read.

use super::{RecordKey, RecordStore, StoreError};
use crate::constants::FIELD_MANAGER;
use crate::crd::ManagedResource;
use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::{json, Value};
use std::marker::PhantomData;
use tracing::debug;

pub struct KubeRecordStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> std::fmt::Debug for KubeRecordStore<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeRecordStore").finish_non_exhaustive()
    }
}

impl<K: ManagedResource> KubeRecordStore<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }

    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

fn map_kube_error(key: &RecordKey, error: kube::Error) -> StoreError {
    match error {
        kube::Error::Api(ae) if ae.code == 409 => StoreError::Conflict(key.clone()),
        kube::Error::Api(ae) if ae.code == 404 => StoreError::NotFound(key.clone()),
        other => StoreError::Kube(other),
    }
}

/// Status body for a merge patch
///
/// `connectionSecretRef` is skipped when unset, so it is sent as an explicit null to clear
/// a previously published reference.
fn status_patch_body(status: Value) -> Value {
    let mut status = status;
    if let Some(fields) = status.as_object_mut() {
        fields
            .entry("connectionSecretRef")
            .or_insert(Value::Null);
    }
    status
}

#[async_trait]
impl<K: ManagedResource> RecordStore<K> for KubeRecordStore<K> {
    async fn get(&self, key: &RecordKey) -> Result<Option<K>, StoreError> {
        self.api(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(|e| map_kube_error(key, e))
    }

    async fn update(&self, record: &K) -> Result<K, StoreError> {
        let key = RecordKey::from_resource(record);
        let meta = record.meta();
        let patch = json!({
            "metadata": {
                "resourceVersion": meta.resource_version,
                "finalizers": meta.finalizers.clone().unwrap_or_default(),
            }
        });
        debug!(record = %key, "patching record metadata");
        self.api(&key.namespace)
            .patch(&key.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_kube_error(&key, e))
    }

    async fn update_status(&self, record: &K) -> Result<K, StoreError> {
        let key = RecordKey::from_resource(record);
        let status = status_patch_body(serde_json::to_value(record.status())?);
        let patch = json!({
            "metadata": { "resourceVersion": record.meta().resource_version },
            "status": status,
        });
        debug!(record = %key, "patching record status");
        self.api(&key.namespace)
            .patch_status(&key.name, &PatchParams::apply(FIELD_MANAGER), &Patch::Merge(&patch))
            .await
            .map_err(|e| map_kube_error(&key, e))
    }
}
