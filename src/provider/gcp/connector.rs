//! Resolves a record's `Provider` into an authenticated GCP client.

use super::{CloudSqlClient, GkeClusterClient};
use crate::config::ControllerConfig;
use crate::crd::{CloudsqlInstanceSpec, GkeClusterSpec, Provider, ProviderRef};
use crate::provider::{ConnectError, Connector, ExternalResourceClient};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use std::time::Duration;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Project and bearer token resolved from a Provider
#[derive(Clone)]
struct GcpCredentials {
    project_id: String,
    token: String,
}

#[derive(Clone)]
pub struct GcpConnector {
    client: Client,
    http: reqwest::Client,
    container_endpoint: String,
    sqladmin_endpoint: String,
}

impl std::fmt::Debug for GcpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpConnector")
            .field("container_endpoint", &self.container_endpoint)
            .field("sqladmin_endpoint", &self.sqladmin_endpoint)
            .finish_non_exhaustive()
    }
}

impl GcpConnector {
    pub fn new(client: Client, config: &ControllerConfig) -> Result<Self, ConnectError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            http,
            container_endpoint: config.gcp_container_endpoint.clone(),
            sqladmin_endpoint: config.gcp_sqladmin_endpoint.clone(),
        })
    }

    async fn credentials(
        &self,
        namespace: &str,
        provider_ref: &ProviderRef,
    ) -> Result<GcpCredentials, ConnectError> {
        let providers: Api<Provider> = Api::namespaced(self.client.clone(), namespace);
        let provider = providers
            .get_opt(&provider_ref.name)
            .await?
            .ok_or_else(|| ConnectError::ProviderNotFound(format!("{namespace}/{}", provider_ref.name)))?;

        if !provider.is_valid() {
            return Err(ConnectError::ProviderInvalid {
                name: provider_ref.name.clone(),
                reason: "projectId is empty".to_string(),
            });
        }

        let secret_ref = &provider.spec.credentials_secret_ref;
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        let secret = secrets.get_opt(&secret_ref.name).await?.ok_or_else(|| {
            ConnectError::Credentials(format!("secret {namespace}/{} not found", secret_ref.name))
        })?;
        let token = token_from_secret(&secret, &secret_ref.key)?;

        debug!(provider = %provider_ref.name, project = %provider.spec.project_id, "resolved GCP credentials");
        Ok(GcpCredentials {
            project_id: provider.spec.project_id,
            token,
        })
    }
}

/// Non-empty bearer token stored under `key`
pub fn token_from_secret(secret: &Secret, key: &str) -> Result<String, ConnectError> {
    let name = secret.metadata.name.as_deref().unwrap_or_default();
    let bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(key))
        .ok_or_else(|| ConnectError::Credentials(format!("secret {name} has no key {key}")))?;
    let token = String::from_utf8(bytes.0.clone()).map_err(|e| {
        ConnectError::Credentials(format!("secret {name} key {key} is not valid UTF-8: {e}"))
    })?;
    let token = token.trim();
    if token.is_empty() {
        return Err(ConnectError::Credentials(format!(
            "secret {name} key {key} is empty"
        )));
    }
    Ok(token.to_string())
}

#[async_trait]
impl Connector<GkeClusterSpec> for GcpConnector {
    async fn connect(
        &self,
        namespace: &str,
        provider: &ProviderRef,
    ) -> Result<Box<dyn ExternalResourceClient<Spec = GkeClusterSpec>>, ConnectError> {
        let credentials = self.credentials(namespace, provider).await?;
        Ok(Box::new(GkeClusterClient::new(
            self.http.clone(),
            &self.container_endpoint,
            credentials.project_id,
            credentials.token,
        )))
    }
}

#[async_trait]
impl Connector<CloudsqlInstanceSpec> for GcpConnector {
    async fn connect(
        &self,
        namespace: &str,
        provider: &ProviderRef,
    ) -> Result<Box<dyn ExternalResourceClient<Spec = CloudsqlInstanceSpec>>, ConnectError> {
        let credentials = self.credentials(namespace, provider).await?;
        Ok(Box::new(CloudSqlClient::new(
            self.http.clone(),
            &self.sqladmin_endpoint,
            credentials.project_id,
            credentials.token,
        )))
    }
}
