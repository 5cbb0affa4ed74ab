//! # Error Policy
//!
//! Handling of reconcile errors that escape the engine (failed record writes).

use super::ControllerContext;
use crate::constants::CONFLICT_REQUEUE_SECS;
use crate::controller::reconciler::ReconcilerError;
use crate::crd::ManagedResource;
use crate::observability;
use crate::store::RecordKey;
use kube_runtime::controller::Action;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Handle reconciliation errors with Fibonacci backoff
///
/// Lost compare-and-swap races are retried almost immediately from a fresh read. Anything
/// else backs off per record.
pub fn handle_reconciliation_error<K: ManagedResource>(
    obj: Arc<K>,
    error: &ReconcilerError,
    ctx: Arc<ControllerContext<K>>,
) -> Action {
    let key = RecordKey::from_resource(obj.as_ref());
    let kind = K::kind(&());

    let error_span = tracing::span!(
        tracing::Level::ERROR,
        "controller.watch.reconciliation_error",
        resource.kind = %kind,
        resource.name = %key.name,
        resource.namespace = %key.namespace,
        error = %error
    );
    let _error_guard = error_span.enter();

    observability::metrics::increment_reconciliation_errors(&kind);

    if error.is_conflict() {
        warn!("Write conflict on {} {}, retrying from a fresh read", kind, key);
        observability::metrics::increment_requeues_total("conflict");
        return Action::requeue(Duration::from_secs(CONFLICT_REQUEUE_SECS));
    }

    error!("Reconciliation error for {} {}: {}", kind, key, error);
    let (backoff_seconds, error_count) = ctx.next_error_backoff(&key);
    info!(
        "Retrying with Fibonacci backoff: {}s (error count: {}, trigger source: error-backoff)",
        backoff_seconds, error_count
    );

    observability::metrics::increment_requeues_total("error-backoff");
    Action::requeue(Duration::from_secs(backoff_seconds))
}
