//! # Constants
//!
//! Default values and well-known names shared across the controller.

/// Field manager used for server-side apply and merge patches
pub const FIELD_MANAGER: &str = "cloud-resource-controller";

/// Finalizer token for GkeCluster records
pub const GKE_CLUSTER_FINALIZER: &str = "finalizer.gkecluster.gcp.cloud-resources.microscaler.io";

/// Finalizer token for CloudsqlInstance records
pub const CLOUDSQL_INSTANCE_FINALIZER: &str =
    "finalizer.cloudsqlinstance.gcp.cloud-resources.microscaler.io";

/// Prefix for derived GKE cluster names
pub const GKE_CLUSTER_NAME_PREFIX: &str = "gke-";

/// GKE cluster status once the control plane is usable
pub const GKE_STATE_RUNNING: &str = "RUNNING";

/// Cloud SQL instance state once the instance accepts connections
pub const CLOUDSQL_STATE_RUNNABLE: &str = "RUNNABLE";

/// Default requeue delay after an external create was requested (seconds)
pub const DEFAULT_POST_CREATE_REQUEUE_SECS: u64 = 30;

/// Default polling interval while waiting for an external resource (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// Requeue delay after losing a compare-and-swap write (seconds)
pub const CONFLICT_REQUEUE_SECS: u64 = 1;

/// Default minimum backoff for failed reconciliations (seconds)
pub const DEFAULT_ERROR_BACKOFF_MIN_SECS: u64 = 5;

/// Default maximum backoff for failed reconciliations (seconds)
pub const DEFAULT_ERROR_BACKOFF_MAX_SECS: u64 = 300;

/// Default GKE API endpoint
pub const DEFAULT_GCP_CONTAINER_ENDPOINT: &str = "https://container.googleapis.com";

/// Default Cloud SQL Admin API endpoint
pub const DEFAULT_GCP_SQLADMIN_ENDPOINT: &str = "https://sqladmin.googleapis.com";

/// Default HTTP server port for metrics and probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default time to wait for the HTTP server to become ready (seconds)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default server readiness poll interval (milliseconds)
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;
