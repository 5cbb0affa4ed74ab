//! # Reconciliation Configuration
//!
//! Requeue timing, error backoff bounds and GCP API endpoints.

use super::env_var_or_default;
use crate::constants::{
    DEFAULT_ERROR_BACKOFF_MAX_SECS, DEFAULT_ERROR_BACKOFF_MIN_SECS,
    DEFAULT_GCP_CONTAINER_ENDPOINT, DEFAULT_GCP_SQLADMIN_ENDPOINT, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_POST_CREATE_REQUEUE_SECS,
};
use std::time::Duration;

/// Controller configuration
///
/// Polling uses a fixed interval. Failed reconciliations back off per record between
/// `error_backoff_min_secs` and `error_backoff_max_secs` (Fibonacci growth).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Delay before the first status poll after an external create was requested (seconds)
    pub post_create_requeue_secs: u64,
    /// Interval between status polls while an external resource is not yet usable (seconds)
    pub poll_interval_secs: u64,
    /// Minimum backoff after a failed reconciliation (seconds)
    pub error_backoff_min_secs: u64,
    /// Maximum backoff after repeated failed reconciliations (seconds)
    pub error_backoff_max_secs: u64,
    /// Base URL of the GKE API
    pub gcp_container_endpoint: String,
    /// Base URL of the Cloud SQL Admin API
    pub gcp_sqladmin_endpoint: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            post_create_requeue_secs: DEFAULT_POST_CREATE_REQUEUE_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            error_backoff_min_secs: DEFAULT_ERROR_BACKOFF_MIN_SECS,
            error_backoff_max_secs: DEFAULT_ERROR_BACKOFF_MAX_SECS,
            gcp_container_endpoint: DEFAULT_GCP_CONTAINER_ENDPOINT.to_string(),
            gcp_sqladmin_endpoint: DEFAULT_GCP_SQLADMIN_ENDPOINT.to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            post_create_requeue_secs: env_var_or_default(
                "POST_CREATE_REQUEUE_SECS",
                DEFAULT_POST_CREATE_REQUEUE_SECS,
            ),
            poll_interval_secs: env_var_or_default(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            ),
            error_backoff_min_secs: env_var_or_default(
                "ERROR_BACKOFF_MIN_SECS",
                DEFAULT_ERROR_BACKOFF_MIN_SECS,
            ),
            error_backoff_max_secs: env_var_or_default(
                "ERROR_BACKOFF_MAX_SECS",
                DEFAULT_ERROR_BACKOFF_MAX_SECS,
            ),
            gcp_container_endpoint: env_var_or_default(
                "GCP_CONTAINER_ENDPOINT",
                DEFAULT_GCP_CONTAINER_ENDPOINT.to_string(),
            ),
            gcp_sqladmin_endpoint: env_var_or_default(
                "GCP_SQLADMIN_ENDPOINT",
                DEFAULT_GCP_SQLADMIN_ENDPOINT.to_string(),
            ),
        }
    }

    pub fn post_create_requeue(&self) -> Duration {
        Duration::from_secs(self.post_create_requeue_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
