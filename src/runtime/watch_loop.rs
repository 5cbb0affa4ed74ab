//! # Watch Loop
//!
//! Runs one `kube_runtime::Controller` per record kind. The controller runtime serializes
//! reconciles per record and runs different records in parallel. Connection Secrets are
//! owned by their records, so edits to them trigger a reconcile of the owner.

use super::{handle_reconciliation_error, ControllerContext, InitializationResult};
use crate::controller::reconciler::{ReconcileOutcome, ReconcilerError};
use crate::crd::ManagedResource;
use crate::observability::metrics;
use crate::store::RecordKey;
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{Api, Client};
use kube_runtime::controller::{self, Action};
use kube_runtime::{watcher, Controller};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Controller entry point for one record
pub async fn reconcile<K: ManagedResource>(
    obj: Arc<K>,
    ctx: Arc<ControllerContext<K>>,
) -> Result<Action, ReconcilerError> {
    let key = RecordKey::from_resource(obj.as_ref());
    let kind = K::kind(&());
    metrics::increment_reconciliations(&kind);

    let start = Instant::now();
    let result = ctx.engine.reconcile(&key).await;
    metrics::observe_reconciliation_duration(&kind, start.elapsed().as_secs_f64());

    Ok(action_for(&ctx, &key, result?))
}

/// Translate an engine outcome into a controller action
pub fn action_for<K: ManagedResource>(
    ctx: &ControllerContext<K>,
    key: &RecordKey,
    outcome: ReconcileOutcome,
) -> Action {
    match outcome {
        ReconcileOutcome::Done => {
            ctx.reset_backoff(key);
            Action::await_change()
        }
        ReconcileOutcome::RetryAfter(delay) => {
            ctx.reset_backoff(key);
            metrics::increment_requeues_total("poll");
            Action::requeue(delay)
        }
        ReconcileOutcome::Retry => {
            let (backoff_seconds, error_count) = ctx.next_error_backoff(key);
            debug!(
                "Requeueing {} in {}s (error count: {}, trigger source: retry-backoff)",
                key, backoff_seconds, error_count
            );
            metrics::increment_requeues_total("retry-backoff");
            Action::requeue(Duration::from_secs(backoff_seconds))
        }
    }
}

/// Run the controller for one record kind until shutdown is signalled
pub async fn run_controller<K: ManagedResource>(client: Client, ctx: Arc<ControllerContext<K>>) {
    let kind = K::kind(&()).to_string();
    let records: Api<K> = Api::all(client.clone());
    let secrets: Api<Secret> = Api::all(client);

    info!("Starting {} controller", kind);
    Controller::new(records, watcher::Config::default())
        .owns(secrets, watcher::Config::default())
        .shutdown_on_signal()
        .run(reconcile::<K>, handle_reconciliation_error::<K>, ctx)
        .for_each(|result| async move {
            match result {
                Ok((object, action)) => debug!("Reconciled {}: {:?}", object, action),
                // Already logged and counted by the error policy.
                Err(controller::Error::ReconcilerFailed(_, object)) => {
                    debug!("Reconcile of {} failed", object);
                }
                Err(controller::Error::ObjectNotFound(object)) => {
                    debug!("{} no longer exists", object);
                }
                Err(e) => warn!("Controller stream error: {}", e),
            }
        })
        .await;
    info!("{} controller stopped", kind);
}

/// Run every record kind's controller concurrently
pub async fn run_watch_loop(init: InitializationResult) -> Result<()> {
    let InitializationResult {
        client,
        gke_clusters,
        cloudsql_instances,
        server_state,
    } = init;

    tokio::join!(
        run_controller(client.clone(), gke_clusters),
        run_controller(client, cloudsql_instances),
    );

    server_state.set_ready(false);
    info!("Shutdown complete");
    Ok(())
}
