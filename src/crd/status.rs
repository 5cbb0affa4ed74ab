//! # Managed Resource Status
//!
//! Status types shared by every managed record kind.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Observed state of a managed record
///
/// `externalName` is the only anchor to the external resource. It is written once, when
/// creation is requested, and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatus {
    /// Conditions represent the latest available observations
    /// At most one of Creating, Ready and Failed is present at any time
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Human-readable description of current state
    #[serde(default)]
    pub message: String,
    /// Lifecycle state as reported by GCP (e.g. PENDING_CREATE, RUNNING, RUNNABLE)
    #[serde(default)]
    pub state: String,
    /// Name of the external resource; empty until creation has been requested
    #[serde(default)]
    pub external_name: String,
    /// Provider-assigned resource identifier (self link)
    #[serde(default, rename = "providerResourceID")]
    pub provider_resource_id: String,
    /// Secret holding the connection details, set once the resource is usable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_secret_ref: Option<ConnectionSecretRef>,
}

/// Condition represents a condition of a resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition (Creating, Ready, Failed)
    pub r#type: String,
    /// Status of the condition (True, False, Unknown)
    pub status: String,
    /// Last transition time
    #[serde(default)]
    pub last_transition_time: Option<String>,
    /// Reason for the condition
    #[serde(default)]
    pub reason: Option<String>,
    /// Message describing the condition
    #[serde(default)]
    pub message: Option<String>,
}

/// Reference to a published connection secret
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSecretRef {
    pub name: String,
    pub namespace: String,
}
