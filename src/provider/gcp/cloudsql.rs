//! Cloud SQL instance client (sqladmin.googleapis.com v1beta4).

use super::rest::{GcpRestClient, Operation};
use crate::constants::CLOUDSQL_STATE_RUNNABLE;
use crate::crd::{admin_username, CloudsqlInstanceSpec};
use crate::provider::{
    ConnectionAttributes, ExternalError, ExternalHandle, ExternalResourceClient, ObservedResource,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CloudSqlClient {
    rest: GcpRestClient,
    project_id: String,
}

impl CloudSqlClient {
    pub fn new(http: reqwest::Client, endpoint: &str, project_id: String, token: String) -> Self {
        Self {
            rest: GcpRestClient::new(http, endpoint, token),
            project_id,
        }
    }

    fn instances_path(&self) -> String {
        format!("sql/v1beta4/projects/{}/instances", self.project_id)
    }
}

/// `instances.insert` request body
pub(super) fn insert_request(name: &str, spec: &CloudsqlInstanceSpec) -> Value {
    let authorized_networks: Vec<Value> = spec
        .authorized_networks
        .iter()
        .map(|cidr| json!({ "value": cidr }))
        .collect();
    json!({
        "name": name,
        "region": spec.region,
        "databaseVersion": spec.database_version,
        "settings": {
            "tier": spec.tier,
            "dataDiskType": spec.storage_type,
            // int64 fields travel as JSON strings in Google APIs
            "dataDiskSizeGb": spec.storage_gb.to_string(),
            "ipConfiguration": { "authorizedNetworks": authorized_networks },
            "userLabels": spec.labels,
        },
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct DatabaseInstance {
    pub state: String,
    pub self_link: String,
    pub database_version: String,
    pub ip_addresses: Vec<IpMapping>,
    pub server_ca_cert: Option<SslCert>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(super) struct IpMapping {
    pub ip_address: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct SslCert {
    pub cert: String,
}

impl DatabaseInstance {
    /// PRIMARY address when one is assigned, otherwise the first address
    fn endpoint(&self) -> String {
        self.ip_addresses
            .iter()
            .find(|ip| ip.kind == "PRIMARY")
            .or_else(|| self.ip_addresses.first())
            .map(|ip| ip.ip_address.clone())
            .unwrap_or_default()
    }
}

impl From<DatabaseInstance> for ObservedResource {
    fn from(instance: DatabaseInstance) -> Self {
        let endpoint = instance.endpoint();
        Self {
            ready: instance.state == CLOUDSQL_STATE_RUNNABLE,
            connection: ConnectionAttributes {
                endpoint,
                username: admin_username(&instance.database_version).to_string(),
                ca_certificate: instance
                    .server_ca_cert
                    .map(|ca| ca.cert)
                    .unwrap_or_default(),
                ..Default::default()
            },
            state: instance.state,
            provider_id: instance.self_link,
        }
    }
}

#[async_trait]
impl ExternalResourceClient for CloudSqlClient {
    type Spec = CloudsqlInstanceSpec;

    async fn create(
        &self,
        name: &str,
        spec: &CloudsqlInstanceSpec,
    ) -> Result<ExternalHandle, ExternalError> {
        debug!(instance = name, region = %spec.region, "creating Cloud SQL instance");
        let operation: Operation = self
            .rest
            .post_json(&self.instances_path(), &insert_request(name, spec))
            .await?;
        Ok(ExternalHandle {
            name: name.to_string(),
            operation: Some(operation.name).filter(|op| !op.is_empty()),
        })
    }

    // Instances are addressed by project and name; the region hint is not part of the path.
    async fn get(&self, _region: &str, name: &str) -> Result<ObservedResource, ExternalError> {
        let instance: DatabaseInstance = self
            .rest
            .get_json(&format!("{}/{}", self.instances_path(), name))
            .await?;
        Ok(instance.into())
    }

    async fn delete(&self, _region: &str, name: &str) -> Result<(), ExternalError> {
        debug!(instance = name, "deleting Cloud SQL instance");
        self.rest
            .delete(&format!("{}/{}", self.instances_path(), name))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_request_shape() {
        let spec: CloudsqlInstanceSpec = serde_json::from_value(json!({
            "providerRef": { "name": "gcp" },
            "region": "us-central1",
            "authorizedNetworks": ["10.0.0.0/8"],
            "storageGb": 20
        }))
        .unwrap();
        let body = insert_request("orders-db-1", &spec);
        assert_eq!(body["name"], "orders-db-1");
        assert_eq!(body["databaseVersion"], "MYSQL_5_7");
        assert_eq!(body["settings"]["tier"], "db-n1-standard-1");
        assert_eq!(body["settings"]["dataDiskType"], "PD_SSD");
        assert_eq!(body["settings"]["dataDiskSizeGb"], "20");
        assert_eq!(
            body["settings"]["ipConfiguration"]["authorizedNetworks"][0]["value"],
            "10.0.0.0/8"
        );
    }

    #[test]
    fn test_runnable_instance_prefers_primary_address() {
        let instance: DatabaseInstance = serde_json::from_value(json!({
            "state": "RUNNABLE",
            "selfLink": "https://sqladmin.googleapis.com/sql/v1beta4/projects/p/instances/db",
            "databaseVersion": "POSTGRES_9_6",
            "ipAddresses": [
                { "ipAddress": "10.1.0.5", "type": "PRIVATE" },
                { "ipAddress": "34.1.2.3", "type": "PRIMARY" }
            ],
            "serverCaCert": { "cert": "-----BEGIN CERTIFICATE-----" }
        }))
        .unwrap();
        let observed = ObservedResource::from(instance);
        assert!(observed.ready);
        assert_eq!(observed.connection.endpoint, "34.1.2.3");
        assert_eq!(observed.connection.username, "postgres");
        assert_eq!(observed.connection.ca_certificate, "-----BEGIN CERTIFICATE-----");
        assert!(observed.connection.password.is_empty());
    }

    #[test]
    fn test_pending_instance_without_addresses() {
        let instance: DatabaseInstance =
            serde_json::from_value(json!({ "state": "PENDING_CREATE" })).unwrap();
        let observed = ObservedResource::from(instance);
        assert!(!observed.ready);
        assert!(observed.connection.endpoint.is_empty());
        assert_eq!(observed.connection.username, "root");
    }
}
