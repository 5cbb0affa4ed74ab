//! Delete branch: tear down the external resource (per reclaim policy) and release the record.

use super::{
    finalizer, operation_result, FailureReason, ReconcileEngine, ReconcileOutcome,
    ReconcilerError,
};
use crate::crd::{ManagedResource, ReclaimPolicy};
use crate::observability::metrics;
use crate::provider::ExternalResourceClient;
use tracing::{debug, info};

pub(super) async fn run<K: ManagedResource>(
    engine: &ReconcileEngine<K>,
    mut record: K,
    client: &dyn ExternalResourceClient<Spec = K::ExternalSpec>,
) -> Result<ReconcileOutcome, ReconcilerError> {
    if !finalizer::has_finalizer(record.meta(), K::FINALIZER) {
        debug!("finalizer already released, waiting for garbage collection");
        return Ok(ReconcileOutcome::Done);
    }

    // A create whose status write was lost leaves the name unrecorded; the derived name
    // still identifies the resource.
    let external_name = match record.external_name() {
        "" => record.derive_external_name(),
        recorded => recorded.to_string(),
    };
    match record.reclaim_policy() {
        ReclaimPolicy::Delete => {
            let result = client.delete(record.location_hint(), &external_name).await;
            metrics::record_external_operation(&K::kind(&()), "delete", operation_result(&result));
            match result {
                Ok(()) => info!("Deleted {} {}", K::kind(&()), external_name),
                Err(e) if e.is_not_found() => {
                    debug!("{} already gone", external_name);
                }
                Err(e) => {
                    return engine
                        .fail(record, FailureReason::DeleteFailed, e.to_string(), true)
                        .await;
                }
            }
        }
        ReclaimPolicy::Retain => {
            info!("Retaining {} {}", K::kind(&()), external_name);
        }
    }

    // Conditions stay as they are until the record is collected, so a failed release still
    // leaves an explanation on the record.
    finalizer::remove_finalizer(record.meta_mut(), K::FINALIZER);
    engine.store.update(&record).await?;
    info!("Removed finalizer {}", K::FINALIZER);
    Ok(ReconcileOutcome::Done)
}
