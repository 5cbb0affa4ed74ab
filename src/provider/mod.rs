//! # Provider Module
//!
//! Capability-abstracted clients for external cloud resources.
//!
//! The reconcile engine only ever talks to [`ExternalResourceClient`] and [`Connector`];
//! concrete GCP implementations live in [`gcp`]. Adding a provider means adding a client,
//! not touching the engine.

pub mod gcp;

use crate::crd::ProviderRef;
use async_trait::async_trait;
use thiserror::Error;

/// Classified failure of an external API call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExternalError {
    /// The external resource does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// A resource with the requested name already exists
    #[error("already exists: {0}")]
    AlreadyExists(String),
    /// The request is permanently invalid; retrying will not help
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Network failures, rate limits, server errors and anything unclassified
    #[error("{0}")]
    Transient(String),
}

impl ExternalError {
    /// Classify an HTTP status code returned by a provider API
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            404 => Self::NotFound(message),
            409 => Self::AlreadyExists(message),
            400 => Self::BadRequest(message),
            _ => Self::Transient(message),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }
}

/// Connection details derived from a usable external resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionAttributes {
    pub endpoint: String,
    pub username: String,
    pub password: String,
    pub ca_certificate: String,
    pub client_certificate: String,
    pub client_key: String,
}

/// Result of a create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalHandle {
    /// Name of the external resource
    pub name: String,
    /// Long-running operation tracking the create, when the API returns one
    pub operation: Option<String>,
}

/// Observed state of an external resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedResource {
    /// Lifecycle state in the provider's own vocabulary (e.g. PENDING_CREATE, RUNNING)
    pub state: String,
    /// Whether `state` means the resource is usable
    pub ready: bool,
    /// Provider-assigned identifier (self link)
    pub provider_id: String,
    pub connection: ConnectionAttributes,
}

/// Create/get/delete capability for one external resource type
#[async_trait]
pub trait ExternalResourceClient: Send + Sync {
    /// Desired configuration accepted by `create`
    type Spec: Send + Sync;

    async fn create(&self, name: &str, spec: &Self::Spec) -> Result<ExternalHandle, ExternalError>;

    async fn get(&self, location: &str, name: &str) -> Result<ObservedResource, ExternalError>;

    async fn delete(&self, location: &str, name: &str) -> Result<(), ExternalError>;
}

/// Failure to obtain an authenticated client
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("provider {0} not found")]
    ProviderNotFound(String),
    #[error("provider {name} is invalid: {reason}")]
    ProviderInvalid { name: String, reason: String },
    #[error("failed to read provider credentials: {0}")]
    Credentials(String),
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Builds an authenticated client from a record's provider reference
#[async_trait]
pub trait Connector<S: Send + Sync + 'static>: Send + Sync {
    async fn connect(
        &self,
        namespace: &str,
        provider: &ProviderRef,
    ) -> Result<Box<dyn ExternalResourceClient<Spec = S>>, ConnectError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert!(ExternalError::from_status(404, "gone").is_not_found());
        assert!(ExternalError::from_status(409, "dup").is_already_exists());
        assert!(ExternalError::from_status(400, "invalid").is_bad_request());
        assert_eq!(
            ExternalError::from_status(503, "unavailable"),
            ExternalError::Transient("unavailable".to_string())
        );
        assert_eq!(
            ExternalError::from_status(429, "slow down"),
            ExternalError::Transient("slow down".to_string())
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ExternalError::BadRequest("machine type unknown".to_string()).to_string(),
            "bad request: machine type unknown"
        );
    }
}
