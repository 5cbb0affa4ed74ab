//! # Custom Resource Definitions
//!
//! CRD types for the Cloud Resource Controller.
//!
//! - `GkeCluster` and `CloudsqlInstance` are managed records: each one describes a single
//!   externally-provisioned GCP resource and tracks its observed state.
//! - `Provider` holds the GCP project and the credentials used to reach it.
//! - `ManagedResource` is the view of a record the reconcile engine works against.

mod cloudsql;
mod gke;
mod managed;
mod provider;
mod status;

pub use cloudsql::{admin_username, CloudsqlInstance, CloudsqlInstanceSpec};
pub use gke::{GkeCluster, GkeClusterSpec};
pub use managed::ManagedResource;
pub use provider::{CredentialsSecretRef, Provider, ProviderSpec};
pub use status::{Condition, ConnectionSecretRef, ResourceStatus};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to the `Provider` (in the record's namespace) used to reach GCP
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderRef {
    /// Name of the Provider resource
    pub name: String,
}

/// What happens to the external resource when its record is deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum ReclaimPolicy {
    /// Delete the external resource together with the record
    Delete,
    /// Leave the external resource in place; only the record goes away
    #[default]
    Retain,
}
