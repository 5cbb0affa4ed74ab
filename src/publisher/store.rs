//! Secret stores backing the connection publisher.

use super::{ConnectionSecret, PublishError, SecretStore};
use crate::constants::FIELD_MANAGER;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::ByteString;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Server-side applies `v1/Secret` objects
#[derive(Clone)]
pub struct KubeSecretStore {
    client: Client,
}

impl std::fmt::Debug for KubeSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeSecretStore").finish_non_exhaustive()
    }
}

impl KubeSecretStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn to_secret(secret: &ConnectionSecret) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(secret.name.clone()),
            namespace: Some(secret.namespace.clone()),
            owner_references: secret.owner.clone().map(|owner| vec![owner]),
            ..Default::default()
        },
        data: Some(
            secret
                .data
                .iter()
                .map(|(key, value)| (key.clone(), ByteString(value.clone())))
                .collect(),
        ),
        type_: Some("Opaque".to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl SecretStore for KubeSecretStore {
    async fn upsert(&self, secret: &ConnectionSecret) -> Result<(), PublishError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &secret.namespace);
        api.patch(
            &secret.name,
            &PatchParams::apply(FIELD_MANAGER).force(),
            &Patch::Apply(&to_secret(secret)),
        )
        .await?;
        Ok(())
    }
}

/// Keeps secrets in memory; can be switched into a failing mode
#[derive(Debug, Default)]
pub struct InMemorySecretStore {
    secrets: Mutex<BTreeMap<(String, String), ConnectionSecret>>,
    failing: AtomicBool,
}

impl InMemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent upsert while `failing` is set
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, namespace: &str, name: &str) -> Option<ConnectionSecret> {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn upsert(&self, secret: &ConnectionSecret) -> Result<(), PublishError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Rejected(format!(
                "secret {}/{} unavailable",
                secret.namespace, secret.name
            )));
        }
        self.secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (secret.namespace.clone(), secret.name.clone()),
                secret.clone(),
            );
        Ok(())
    }
}
