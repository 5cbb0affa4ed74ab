//! # Connection Publisher
//!
//! Turns the connection attributes of a usable external resource into a Secret owned by
//! the record. The Secret is named after the record and lives in its namespace, so
//! publishing the same attributes twice is an idempotent upsert.

mod store;

pub use store::{InMemorySecretStore, KubeSecretStore};

use crate::crd::{ConnectionSecretRef, ManagedResource};
use crate::observability;
use crate::provider::ConnectionAttributes;
use async_trait::async_trait;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const ENDPOINT_KEY: &str = "endpoint";
pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const CA_CERTIFICATE_KEY: &str = "ca-certificate";
pub const CLIENT_CERTIFICATE_KEY: &str = "client-certificate";
pub const CLIENT_KEY_KEY: &str = "client-key";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("record {0} has no namespace")]
    MissingNamespace(String),
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
    #[error("secret store rejected write: {0}")]
    Rejected(String),
}

/// Connection secret as handed to a [`SecretStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSecret {
    pub name: String,
    pub namespace: String,
    /// Controller reference to the owning record, so the secret is collected with it
    pub owner: Option<OwnerReference>,
    pub data: BTreeMap<String, Vec<u8>>,
}

/// Upsert target for connection secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn upsert(&self, secret: &ConnectionSecret) -> Result<(), PublishError>;
}

/// The fixed six-key secret payload
pub fn connection_data(attributes: &ConnectionAttributes) -> BTreeMap<String, Vec<u8>> {
    [
        (ENDPOINT_KEY, &attributes.endpoint),
        (USERNAME_KEY, &attributes.username),
        (PASSWORD_KEY, &attributes.password),
        (CA_CERTIFICATE_KEY, &attributes.ca_certificate),
        (CLIENT_CERTIFICATE_KEY, &attributes.client_certificate),
        (CLIENT_KEY_KEY, &attributes.client_key),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
    .collect()
}

#[derive(Clone)]
pub struct ConnectionPublisher {
    store: Arc<dyn SecretStore>,
}

impl std::fmt::Debug for ConnectionPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPublisher").finish_non_exhaustive()
    }
}

impl ConnectionPublisher {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Upsert the connection secret for `owner` and return a reference to it
    pub async fn publish<K: ManagedResource>(
        &self,
        owner: &K,
        attributes: &ConnectionAttributes,
    ) -> Result<ConnectionSecretRef, PublishError> {
        let name = owner.name_any();
        let namespace = owner
            .namespace()
            .ok_or_else(|| PublishError::MissingNamespace(name.clone()))?;

        let secret = ConnectionSecret {
            name: name.clone(),
            namespace: namespace.clone(),
            owner: owner.controller_owner_ref(&()),
            data: connection_data(attributes),
        };
        debug!(secret.name = %name, secret.namespace = %namespace, "publishing connection secret");
        self.store.upsert(&secret).await?;

        observability::metrics::increment_connection_secrets_published();
        info!("Published connection secret {}/{}", namespace, name);
        Ok(ConnectionSecretRef { name, namespace })
    }
}
