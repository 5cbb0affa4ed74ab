//! # Provider
//!
//! GCP provider configuration referenced by managed records.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Provider Custom Resource Definition
///
/// Points at a GCP project and at the Secret holding an OAuth2 access token for it.
/// Minting and refreshing the token is left to the platform (e.g. a Workload Identity sidecar).
///
/// # Example
///
/// ```yaml
/// apiVersion: gcp.cloud-resources.microscaler.io/v1alpha1
/// kind: Provider
/// metadata:
///   name: gcp-provider
///   namespace: default
/// spec:
///   projectId: my-gcp-project
///   credentialsSecretRef:
///     name: gcp-token
///     key: token
/// ```
#[derive(CustomResource, Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[kube(
    kind = "Provider",
    group = "gcp.cloud-resources.microscaler.io",
    version = "v1alpha1",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    /// GCP project that owns the managed resources
    pub project_id: String,
    /// Secret key holding the access token
    pub credentials_secret_ref: CredentialsSecretRef,
}

/// Secret key selector for provider credentials
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsSecretRef {
    /// Secret name (same namespace as the Provider)
    pub name: String,
    /// Key within the secret data
    #[serde(default = "default_credentials_key")]
    pub key: String,
}

fn default_credentials_key() -> String {
    "token".to_string()
}

impl Provider {
    /// A provider is usable once it names a project
    pub fn is_valid(&self) -> bool {
        !self.spec.project_id.trim().is_empty()
    }
}
