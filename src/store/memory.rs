//! In-memory record store.
//!
//! Mirrors the API server behaviour the engine relies on: uid and resourceVersion
//! assignment, compare-and-swap writes, and garbage collection of records whose deletion
//! was requested once their finalizer list is empty.

use super::{RecordKey, RecordStore, StoreError};
use crate::crd::ManagedResource;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct InMemoryRecordStore<K> {
    records: Mutex<BTreeMap<RecordKey, K>>,
    version: AtomicU64,
    failing_updates: AtomicBool,
}

impl<K> Default for InMemoryRecordStore<K> {
    fn default() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            version: AtomicU64::new(0),
            failing_updates: AtomicBool::new(false),
        }
    }
}

impl<K: ManagedResource> InMemoryRecordStore<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, BTreeMap<RecordKey, K>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_version(&self) -> String {
        (self.version.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }

    /// Create a record, assigning a uid when it has none
    pub fn insert(&self, mut record: K) -> K {
        let meta = record.meta_mut();
        if meta.namespace.is_none() {
            meta.namespace = Some("default".to_string());
        }
        if meta.uid.is_none() {
            meta.uid = Some(uuid::Uuid::new_v4().to_string());
        }
        meta.resource_version = Some(self.next_version());
        let key = RecordKey::from_resource(&record);
        self.records().insert(key, record.clone());
        record
    }

    /// Current record without going through the async trait
    pub fn snapshot(&self, key: &RecordKey) -> Option<K> {
        self.records().get(key).cloned()
    }

    /// Reject metadata writes as lost compare-and-swap races while `failing` is set
    pub fn set_failing_updates(&self, failing: bool) {
        self.failing_updates.store(failing, Ordering::SeqCst);
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.records().contains_key(key)
    }

    /// Request deletion the way an external actor would
    ///
    /// Records without finalizers are removed immediately.
    pub fn mark_deleted(&self, key: &RecordKey) -> Result<(), StoreError> {
        let deleted_at: Time = serde_json::from_value(serde_json::Value::String(
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        ))?;
        let version = self.next_version();
        let mut records = self.records();
        let record = records
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let meta = record.meta_mut();
        if meta.deletion_timestamp.is_none() {
            meta.deletion_timestamp = Some(deleted_at);
        }
        meta.resource_version = Some(version);
        collect_garbage(&mut records, key);
        Ok(())
    }

    /// Apply `mutate` to the stored record after a resourceVersion check
    fn write(&self, record: &K, mutate: impl FnOnce(&mut K, &K)) -> Result<K, StoreError> {
        let key = RecordKey::from_resource(record);
        let version = self.next_version();
        let mut records = self.records();
        let stored = records
            .get_mut(&key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        if stored.meta().resource_version != record.meta().resource_version {
            return Err(StoreError::Conflict(key));
        }
        mutate(stored, record);
        stored.meta_mut().resource_version = Some(version);
        let written = stored.clone();
        collect_garbage(&mut records, &key);
        Ok(written)
    }
}

/// Remove a record once deletion was requested and no finalizer holds it
fn collect_garbage<K: ManagedResource>(records: &mut BTreeMap<RecordKey, K>, key: &RecordKey) {
    let releasable = records.get(key).is_some_and(|record| {
        let meta = record.meta();
        meta.deletion_timestamp.is_some() && meta.finalizers.as_ref().is_none_or(Vec::is_empty)
    });
    if releasable {
        records.remove(key);
    }
}

#[async_trait]
impl<K: ManagedResource> RecordStore<K> for InMemoryRecordStore<K> {
    async fn get(&self, key: &RecordKey) -> Result<Option<K>, StoreError> {
        Ok(self.snapshot(key))
    }

    async fn update(&self, record: &K) -> Result<K, StoreError> {
        if self.failing_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Conflict(RecordKey::from_resource(record)));
        }
        self.write(record, |stored, incoming| {
            stored.meta_mut().finalizers = incoming.meta().finalizers.clone();
        })
    }

    async fn update_status(&self, record: &K) -> Result<K, StoreError> {
        self.write(record, |stored, incoming| {
            *stored.status_mut() = incoming.status().cloned().unwrap_or_default();
        })
    }
}
