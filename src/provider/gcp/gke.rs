//! GKE cluster client (container.googleapis.com v1).

use super::rest::{GcpRestClient, Operation};
use crate::constants::GKE_STATE_RUNNING;
use crate::crd::GkeClusterSpec;
use crate::provider::{
    ConnectionAttributes, ExternalError, ExternalHandle, ExternalResourceClient, ObservedResource,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GkeClusterClient {
    rest: GcpRestClient,
    project_id: String,
}

impl GkeClusterClient {
    pub fn new(http: reqwest::Client, endpoint: &str, project_id: String, token: String) -> Self {
        Self {
            rest: GcpRestClient::new(http, endpoint, token),
            project_id,
        }
    }

    fn clusters_path(&self, zone: &str) -> String {
        format!("v1/projects/{}/zones/{}/clusters", self.project_id, zone)
    }
}

/// `projects.zones.clusters.create` request body
pub(super) fn create_request(name: &str, spec: &GkeClusterSpec) -> Value {
    let mut cluster = json!({
        "name": name,
        "initialNodeCount": spec.num_nodes,
        "nodeConfig": { "machineType": spec.machine_type },
        "resourceLabels": spec.labels,
        "ipAllocationPolicy": { "useIpAliases": spec.enable_ip_alias },
        "masterAuth": {
            "clientCertificateConfig": {
                "issueClientCertificate": spec.issue_client_certificate,
            },
        },
    });
    if let Some(version) = &spec.cluster_version {
        cluster["initialClusterVersion"] = json!(version);
    }
    if let Some(username) = &spec.master_username {
        cluster["masterAuth"]["username"] = json!(username);
    }
    json!({ "cluster": cluster })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct Cluster {
    pub status: String,
    pub self_link: String,
    pub endpoint: String,
    pub master_auth: MasterAuth,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct MasterAuth {
    pub username: String,
    pub password: String,
    pub cluster_ca_certificate: String,
    pub client_certificate: String,
    pub client_key: String,
}

impl From<Cluster> for ObservedResource {
    fn from(cluster: Cluster) -> Self {
        Self {
            ready: cluster.status == GKE_STATE_RUNNING,
            state: cluster.status,
            provider_id: cluster.self_link,
            connection: ConnectionAttributes {
                endpoint: cluster.endpoint,
                username: cluster.master_auth.username,
                password: cluster.master_auth.password,
                ca_certificate: cluster.master_auth.cluster_ca_certificate,
                client_certificate: cluster.master_auth.client_certificate,
                client_key: cluster.master_auth.client_key,
            },
        }
    }
}

#[async_trait]
impl ExternalResourceClient for GkeClusterClient {
    type Spec = GkeClusterSpec;

    async fn create(&self, name: &str, spec: &GkeClusterSpec) -> Result<ExternalHandle, ExternalError> {
        debug!(cluster = name, zone = %spec.zone, "creating GKE cluster");
        let operation: Operation = self
            .rest
            .post_json(&self.clusters_path(&spec.zone), &create_request(name, spec))
            .await?;
        Ok(ExternalHandle {
            name: name.to_string(),
            operation: Some(operation.name).filter(|op| !op.is_empty()),
        })
    }

    async fn get(&self, zone: &str, name: &str) -> Result<ObservedResource, ExternalError> {
        let cluster: Cluster = self
            .rest
            .get_json(&format!("{}/{}", self.clusters_path(zone), name))
            .await?;
        Ok(cluster.into())
    }

    async fn delete(&self, zone: &str, name: &str) -> Result<(), ExternalError> {
        debug!(cluster = name, zone, "deleting GKE cluster");
        self.rest
            .delete(&format!("{}/{}", self.clusters_path(zone), name))
            .await
    }
}
