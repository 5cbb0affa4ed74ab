//! # Initialization
//!
//! Controller initialization logic including rustls setup, tracing, metrics, server
//! startup, Kubernetes client setup and wiring of the reconcile engines.

use crate::config::{load_config, ControllerConfig, ServerConfig};
use crate::controller::reconciler::{ReconcileEngine, RequeueTiming};
use crate::controller::server::{start_server, ServerState};
use crate::crd::{CloudsqlInstance, GkeCluster, ManagedResource};
use crate::observability;
use crate::provider::gcp::GcpConnector;
use crate::provider::Connector;
use crate::publisher::{ConnectionPublisher, KubeSecretStore};
use crate::runtime::ControllerContext;
use crate::store::KubeRecordStore;
use anyhow::{anyhow, Context, Result};
use kube::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Initialization result containing all necessary components for the controller
pub struct InitializationResult {
    /// Kubernetes client
    pub client: Client,
    /// Reconcile context for GkeCluster records
    pub gke_clusters: Arc<ControllerContext<GkeCluster>>,
    /// Reconcile context for CloudsqlInstance records
    pub cloudsql_instances: Arc<ControllerContext<CloudsqlInstance>>,
    /// Server state for health checks
    pub server_state: Arc<ServerState>,
}

/// Initialize the controller runtime
///
/// This function handles:
/// - rustls crypto provider setup
/// - Tracing subscriber setup
/// - Metrics registration
/// - HTTP server startup
/// - Kubernetes client creation
/// - Reconcile engine setup for every record kind
pub async fn initialize() -> Result<InitializationResult> {
    // Required for rustls 0.23+ when no default provider is set via features.
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_provider| anyhow!("Failed to install rustls crypto provider"))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cloud_resource_controller=info".into()),
        )
        .init();

    info!("Starting Cloud Resource Controller v{}", env!("CARGO_PKG_VERSION"));

    let (controller_config, server_config) = load_config();
    info!(
        "Configuration: post_create_requeue={}s, poll_interval={}s, error_backoff={}s..{}s",
        controller_config.post_create_requeue_secs,
        controller_config.poll_interval_secs,
        controller_config.error_backoff_min_secs,
        controller_config.error_backoff_max_secs
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_state_clone = Arc::clone(&server_state);
    let server_port = server_config.metrics_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(server_port, server_state_clone).await {
            error!("HTTP server error: {:#}", e);
        }
    });

    // Readiness probes should pass as soon as the watch loop starts.
    wait_for_server_ready(&server_state, &server_handle, &server_config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let connector = Arc::new(
        GcpConnector::new(client.clone(), &controller_config)
            .context("Failed to create GCP connector")?,
    );
    let publisher = ConnectionPublisher::new(Arc::new(KubeSecretStore::new(client.clone())));

    let gke_clusters = build_context::<GkeCluster>(
        &client,
        connector.clone(),
        publisher.clone(),
        &controller_config,
    );
    let cloudsql_instances = build_context::<CloudsqlInstance>(
        &client,
        connector,
        publisher,
        &controller_config,
    );

    info!("Controller initialized, starting watch loop...");

    Ok(InitializationResult {
        client,
        gke_clusters,
        cloudsql_instances,
        server_state,
    })
}

fn build_context<K: ManagedResource>(
    client: &Client,
    connector: Arc<dyn Connector<K::ExternalSpec>>,
    publisher: ConnectionPublisher,
    config: &ControllerConfig,
) -> Arc<ControllerContext<K>> {
    let engine = ReconcileEngine::new(
        Arc::new(KubeRecordStore::<K>::new(client.clone())),
        connector,
        publisher,
        RequeueTiming::from(config),
    );
    Arc::new(ControllerContext::new(engine, config))
}

/// Wait for the HTTP server to become ready
async fn wait_for_server_ready(
    server_state: &Arc<ServerState>,
    server_handle: &tokio::task::JoinHandle<()>,
    config: &ServerConfig,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow!("HTTP server failed to start"));
        }

        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }

        if start_time.elapsed() > startup_timeout {
            return Err(anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }

        tokio::time::sleep(poll_interval).await;
    }
}
