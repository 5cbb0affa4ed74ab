//! # CloudsqlInstance
//!
//! Managed record for a Cloud SQL database instance.

use super::{ManagedResource, ProviderRef, ReclaimPolicy, ResourceStatus};
use crate::constants::CLOUDSQL_INSTANCE_FINALIZER;
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CloudsqlInstance Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: gcp.cloud-resources.microscaler.io/v1alpha1
/// kind: CloudsqlInstance
/// metadata:
///   name: orders-db
///   namespace: default
/// spec:
///   providerRef:
///     name: gcp-provider
///   region: us-central1
///   databaseVersion: POSTGRES_9_6
///   tier: db-custom-1-3840
///   authorizedNetworks:
///     - 10.0.0.0/8
/// ```
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "CloudsqlInstance",
    group = "gcp.cloud-resources.microscaler.io",
    version = "v1alpha1",
    namespaced,
    status = "ResourceStatus",
    shortname = "cloudsql",
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.state"}, {"name":"Instance", "type":"string", "jsonPath":".status.externalName"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct CloudsqlInstanceSpec {
    pub provider_ref: ProviderRef,
    /// GCP region for the instance (e.g. "us-central1")
    pub region: String,
    /// Database engine and version (e.g. "MYSQL_5_7", "POSTGRES_9_6")
    #[serde(default = "default_database_version")]
    pub database_version: String,
    /// Machine tier (e.g. "db-n1-standard-1")
    #[serde(default = "default_tier")]
    pub tier: String,
    /// Data disk type: PD_SSD or PD_HDD
    #[serde(default = "default_storage_type")]
    pub storage_type: String,
    /// Data disk size in GB
    #[serde(default = "default_storage_gb")]
    pub storage_gb: i64,
    /// CIDR ranges allowed to connect
    #[serde(default)]
    pub authorized_networks: Vec<String>,
    /// User labels applied to the instance
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
}

fn default_database_version() -> String {
    "MYSQL_5_7".to_string()
}

fn default_tier() -> String {
    "db-n1-standard-1".to_string()
}

fn default_storage_type() -> String {
    "PD_SSD".to_string()
}

fn default_storage_gb() -> i64 {
    10
}

/// Built-in administrative user for a database engine version
pub fn admin_username(database_version: &str) -> &'static str {
    if database_version.starts_with("POSTGRES") {
        "postgres"
    } else {
        "root"
    }
}

impl ManagedResource for CloudsqlInstance {
    type ExternalSpec = CloudsqlInstanceSpec;

    const FINALIZER: &'static str = CLOUDSQL_INSTANCE_FINALIZER;

    fn external_spec(&self) -> &CloudsqlInstanceSpec {
        &self.spec
    }

    fn provider_ref(&self) -> &ProviderRef {
        &self.spec.provider_ref
    }

    fn reclaim_policy(&self) -> ReclaimPolicy {
        self.spec.reclaim_policy
    }

    fn location_hint(&self) -> &str {
        &self.spec.region
    }

    fn derive_external_name(&self) -> String {
        format!("{}-{}", self.name_any(), self.identity())
    }

    fn running_message(external_name: &str) -> String {
        format!("Cloud SQL instance {external_name} is running")
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ResourceStatus {
        self.status.get_or_insert_with(ResourceStatus::default)
    }
}
