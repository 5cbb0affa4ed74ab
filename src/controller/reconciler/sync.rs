//! Sync branch: observe the external resource and publish its connection secret once usable.

use super::status::{ConditionType, StatusTracker};
use super::{
    current_status, operation_result, FailureReason, ReconcileEngine, ReconcileOutcome,
    ReconcilerError,
};
use crate::crd::ManagedResource;
use crate::observability::metrics;
use crate::provider::ExternalResourceClient;
use tracing::{debug, info};

pub(super) async fn run<K: ManagedResource>(
    engine: &ReconcileEngine<K>,
    mut record: K,
    client: &dyn ExternalResourceClient<Spec = K::ExternalSpec>,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let external_name = record.external_name().to_string();
    let result = client.get(record.location_hint(), &external_name).await;
    metrics::record_external_operation(&K::kind(&()), "get", operation_result(&result));

    let observed = match result {
        Ok(observed) => observed,
        Err(e) => {
            return engine
                .fail(record, FailureReason::SyncFailed, e.to_string(), true)
                .await;
        }
    };

    let before = current_status(&record);

    if !observed.ready {
        debug!(state = %observed.state, "{} not usable yet", external_name);
        let status = record.status_mut();
        status.state = observed.state;
        status.provider_resource_id = observed.provider_id;
        status.connection_secret_ref = None;
        // A successful poll supersedes a failure from an earlier attempt.
        if status.is_condition(ConditionType::Failed) {
            status.set_creating(format!("Creating {external_name}"));
        }
        engine.write_status(record, &before).await?;
        return Ok(ReconcileOutcome::RetryAfter(engine.timing.poll));
    }

    let secret_ref = match engine.publisher.publish(&record, &observed.connection).await {
        Ok(secret_ref) => secret_ref,
        Err(e) => {
            return engine
                .fail(record, FailureReason::ConnectionSecretFailed, e.to_string(), true)
                .await;
        }
    };

    let status = record.status_mut();
    status.state = observed.state;
    status.provider_resource_id = observed.provider_id;
    status.connection_secret_ref = Some(secret_ref);
    status.set_ready(K::running_message(&external_name));

    if current_status(&record) != before {
        info!("{} {} is ready", K::kind(&()), external_name);
    }
    engine.write_status(record, &before).await?;
    Ok(ReconcileOutcome::Done)
}
