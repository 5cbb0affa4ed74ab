//! Create branch: request the external resource under a derived name.

use super::status::StatusTracker;
use super::{
    current_status, operation_result, FailureReason, ReconcileEngine, ReconcileOutcome,
    ReconcilerError,
};
use crate::crd::ManagedResource;
use crate::observability::metrics;
use crate::provider::{ExternalError, ExternalHandle, ExternalResourceClient};
use tracing::info;

/// What to do with the result of a create call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateDecision {
    /// The resource exists (new or from an earlier attempt); start polling
    Proceed,
    /// Record a failure; retry unless the request can never succeed
    Fail { message: String, retry: bool },
}

pub fn classify_create(result: &Result<ExternalHandle, ExternalError>) -> CreateDecision {
    match result {
        Ok(_) => CreateDecision::Proceed,
        Err(e) if e.is_already_exists() => CreateDecision::Proceed,
        Err(e) => CreateDecision::Fail {
            message: e.to_string(),
            retry: !e.is_bad_request(),
        },
    }
}

pub(super) async fn run<K: ManagedResource>(
    engine: &ReconcileEngine<K>,
    mut record: K,
    client: &dyn ExternalResourceClient<Spec = K::ExternalSpec>,
) -> Result<ReconcileOutcome, ReconcilerError> {
    let external_name = record.derive_external_name();
    let result = client.create(&external_name, record.external_spec()).await;
    metrics::record_external_operation(&K::kind(&()), "create", operation_result(&result));

    match classify_create(&result) {
        CreateDecision::Fail { message, retry } => {
            engine
                .fail(record, FailureReason::CreateFailed, message, retry)
                .await
        }
        CreateDecision::Proceed => {
            info!("Requested creation of {} {}", K::kind(&()), external_name);
            let before = current_status(&record);
            let status = record.status_mut();
            status.set_creating(format!("Creating {external_name}"));
            status.external_name = external_name;
            engine.write_status(record, &before).await?;
            Ok(ReconcileOutcome::RetryAfter(engine.timing.post_create))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> ExternalHandle {
        ExternalHandle {
            name: "gke-1".to_string(),
            operation: Some("operation-1".to_string()),
        }
    }

    #[test]
    fn test_success_proceeds() {
        assert_eq!(classify_create(&Ok(handle())), CreateDecision::Proceed);
    }

    #[test]
    fn test_already_exists_is_absorbed() {
        let result = Err(ExternalError::AlreadyExists("gke-1".to_string()));
        assert_eq!(classify_create(&result), CreateDecision::Proceed);
    }

    #[test]
    fn test_bad_request_is_not_retried() {
        let result = Err(ExternalError::BadRequest("invalid zone".to_string()));
        assert_eq!(
            classify_create(&result),
            CreateDecision::Fail {
                message: "bad request: invalid zone".to_string(),
                retry: false
            }
        );
    }

    #[test]
    fn test_other_errors_are_retried() {
        for err in [
            ExternalError::Transient("503".to_string()),
            ExternalError::NotFound("project".to_string()),
        ] {
            let CreateDecision::Fail { retry, .. } = classify_create(&Err(err)) else {
                panic!("expected failure");
            };
            assert!(retry);
        }
    }
}
