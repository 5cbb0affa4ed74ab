//! # Record Stores
//!
//! Persistence seam for managed records.
//!
//! Every write carries the record's `resourceVersion`; a concurrent writer makes the write
//! fail with [`StoreError::Conflict`] and the reconcile is retried from a fresh read.

mod kubernetes;
mod memory;

pub use kubernetes::KubeRecordStore;
pub use memory::InMemoryRecordStore;

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Namespace and name of a record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub namespace: String,
    pub name: String,
}

impl RecordKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key for a Kubernetes object; objects without a namespace land in `default`
    pub fn from_resource<K: kube::Resource>(resource: &K) -> Self {
        let meta = resource.meta();
        Self::new(
            meta.namespace.as_deref().unwrap_or("default"),
            meta.name.as_deref().unwrap_or_default(),
        )
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(RecordKey),
    #[error("record {0} was modified concurrently")]
    Conflict(RecordKey),
    #[error("Kubernetes API error: {0}")]
    Kube(#[source] kube::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Read and compare-and-swap write access to records of kind `K`
#[async_trait]
pub trait RecordStore<K>: Send + Sync {
    /// Current record, or `None` once it has been removed
    async fn get(&self, key: &RecordKey) -> Result<Option<K>, StoreError>;

    /// Persist metadata (finalizers); returns the record as stored
    async fn update(&self, record: &K) -> Result<K, StoreError>;

    /// Persist status; returns the record as stored
    async fn update_status(&self, record: &K) -> Result<K, StoreError>;
}
