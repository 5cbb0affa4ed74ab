//! # GkeCluster
//!
//! Managed record for a GKE cluster.

use super::{ManagedResource, ProviderRef, ReclaimPolicy, ResourceStatus};
use crate::constants::{GKE_CLUSTER_FINALIZER, GKE_CLUSTER_NAME_PREFIX};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GkeCluster Custom Resource Definition
///
/// # Example
///
/// ```yaml
/// apiVersion: gcp.cloud-resources.microscaler.io/v1alpha1
/// kind: GkeCluster
/// metadata:
///   name: staging
///   namespace: default
/// spec:
///   providerRef:
///     name: gcp-provider
///   zone: us-central1-a
///   numNodes: 3
///   reclaimPolicy: Delete
/// ```
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "GkeCluster",
    group = "gcp.cloud-resources.microscaler.io",
    version = "v1alpha1",
    namespaced,
    status = "ResourceStatus",
    shortname = "gke",
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.state"}, {"name":"Cluster", "type":"string", "jsonPath":".status.externalName"}, {"name":"Ready", "type":"string", "jsonPath":".status.conditions[?(@.type==\"Ready\")].status"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GkeClusterSpec {
    pub provider_ref: ProviderRef,
    /// Compute zone for the cluster (e.g. "us-central1-a")
    pub zone: String,
    /// Initial Kubernetes version; GKE picks its default when omitted
    #[serde(default)]
    pub cluster_version: Option<String>,
    /// Machine type for the default node pool
    #[serde(default = "default_machine_type")]
    pub machine_type: String,
    /// Initial node count for the default node pool
    #[serde(default = "default_num_nodes")]
    pub num_nodes: i32,
    /// Use VPC-native (alias IP) networking
    #[serde(default)]
    pub enable_ip_alias: bool,
    /// Basic-auth username for the master endpoint (disabled when omitted)
    #[serde(default)]
    pub master_username: Option<String>,
    /// Issue a client certificate for the master endpoint
    #[serde(default)]
    pub issue_client_certificate: bool,
    /// Resource labels applied to the cluster
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub reclaim_policy: ReclaimPolicy,
}

fn default_machine_type() -> String {
    "n1-standard-1".to_string()
}

fn default_num_nodes() -> i32 {
    1
}

impl ManagedResource for GkeCluster {
    type ExternalSpec = GkeClusterSpec;

    const FINALIZER: &'static str = GKE_CLUSTER_FINALIZER;

    fn external_spec(&self) -> &GkeClusterSpec {
        &self.spec
    }

    fn provider_ref(&self) -> &ProviderRef {
        &self.spec.provider_ref
    }

    fn reclaim_policy(&self) -> ReclaimPolicy {
        self.spec.reclaim_policy
    }

    fn location_hint(&self) -> &str {
        &self.spec.zone
    }

    fn derive_external_name(&self) -> String {
        format!("{GKE_CLUSTER_NAME_PREFIX}{}", self.identity())
    }

    fn running_message(external_name: &str) -> String {
        format!("GKE cluster {external_name} is running")
    }

    fn status(&self) -> Option<&ResourceStatus> {
        self.status.as_ref()
    }

    fn status_mut(&mut self) -> &mut ResourceStatus {
        self.status.get_or_insert_with(ResourceStatus::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(uid: Option<&str>) -> GkeCluster {
        let mut cluster: GkeCluster = serde_json::from_value(serde_json::json!({
            "apiVersion": "gcp.cloud-resources.microscaler.io/v1alpha1",
            "kind": "GkeCluster",
            "metadata": { "name": "staging", "namespace": "default" },
            "spec": { "providerRef": { "name": "gcp" }, "zone": "us-central1-a" }
        }))
        .unwrap();
        cluster.metadata.uid = uid.map(str::to_string);
        cluster
    }

    #[test]
    fn test_spec_defaults() {
        let cluster = cluster(None);
        assert_eq!(cluster.spec.machine_type, "n1-standard-1");
        assert_eq!(cluster.spec.num_nodes, 1);
        assert_eq!(cluster.spec.reclaim_policy, ReclaimPolicy::Retain);
        assert!(cluster.spec.labels.is_empty());
    }

    #[test]
    fn test_external_name_uses_uid() {
        let cluster = cluster(Some("5e7c1a2b-0000-4000-8000-000000000001"));
        assert_eq!(
            cluster.derive_external_name(),
            "gke-5e7c1a2b-0000-4000-8000-000000000001"
        );
        assert_eq!(cluster.location_hint(), "us-central1-a");
    }

    #[test]
    fn test_external_name_without_uid_falls_back_to_name() {
        assert_eq!(cluster(None).derive_external_name(), "gke-staging");
    }

    #[test]
    fn test_external_name_empty_before_create() {
        let mut cluster = cluster(Some("abc"));
        assert_eq!(cluster.external_name(), "");
        cluster.status_mut().external_name = "gke-abc".to_string();
        assert_eq!(cluster.external_name(), "gke-abc");
    }
}
