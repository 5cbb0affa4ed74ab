//! # Reconciler
//!
//! The per-record state machine.
//!
//! On each trigger the engine fetches the record, connects to the external API through the
//! record's provider, and then runs exactly one branch:
//!
//! - **delete** when deletion was requested
//! - **create** when no external name has been recorded yet
//! - **sync** otherwise
//!
//! Waiting for the external system is expressed as [`ReconcileOutcome::RetryAfter`], never
//! as a sleep inside reconcile.

mod create;
mod delete;
pub mod finalizer;
pub mod status;
mod sync;
pub mod types;

pub use create::{classify_create, CreateDecision};
pub use status::{ConditionType, StatusTracker};
pub use types::{FailureReason, ReconcileOutcome, ReconcilerError};

use crate::config::ControllerConfig;
use crate::crd::{ManagedResource, ResourceStatus};
use crate::provider::{Connector, ExternalError};
use crate::publisher::ConnectionPublisher;
use crate::store::{RecordKey, RecordStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

/// Fixed delays used for `RetryAfter`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequeueTiming {
    /// Delay before the first poll after a create was accepted
    pub post_create: Duration,
    /// Interval between polls while the external resource is not usable
    pub poll: Duration,
}

impl From<&ControllerConfig> for RequeueTiming {
    fn from(config: &ControllerConfig) -> Self {
        Self {
            post_create: config.post_create_requeue(),
            poll: config.poll_interval(),
        }
    }
}

impl Default for RequeueTiming {
    fn default() -> Self {
        Self::from(&ControllerConfig::default())
    }
}

/// Reconcile engine for one record kind
pub struct ReconcileEngine<K: ManagedResource> {
    store: Arc<dyn RecordStore<K>>,
    connector: Arc<dyn Connector<K::ExternalSpec>>,
    publisher: ConnectionPublisher,
    timing: RequeueTiming,
}

impl<K: ManagedResource> std::fmt::Debug for ReconcileEngine<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconcileEngine")
            .field("kind", &K::kind(&()))
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}

impl<K: ManagedResource> ReconcileEngine<K> {
    pub fn new(
        store: Arc<dyn RecordStore<K>>,
        connector: Arc<dyn Connector<K::ExternalSpec>>,
        publisher: ConnectionPublisher,
        timing: RequeueTiming,
    ) -> Self {
        Self {
            store,
            connector,
            publisher,
            timing,
        }
    }

    /// Converge one record toward its desired state
    pub async fn reconcile(&self, key: &RecordKey) -> Result<ReconcileOutcome, ReconcilerError> {
        let span = tracing::info_span!(
            "reconcile",
            resource.kind = %K::kind(&()),
            resource.name = %key.name,
            resource.namespace = %key.namespace,
        );
        self.reconcile_record(key).instrument(span).await
    }

    async fn reconcile_record(&self, key: &RecordKey) -> Result<ReconcileOutcome, ReconcilerError> {
        let Some(mut record) = self.store.get(key).await? else {
            debug!("record no longer exists, nothing to do");
            return Ok(ReconcileOutcome::Done);
        };

        let client = match self
            .connector
            .connect(&key.namespace, record.provider_ref())
            .await
        {
            Ok(client) => client,
            Err(e) => {
                return self
                    .fail(record, FailureReason::ClientConnectionFailed, e.to_string(), true)
                    .await;
            }
        };

        if record.meta().deletion_timestamp.is_some() {
            return delete::run(self, record, client.as_ref()).await;
        }

        if finalizer::add_finalizer(record.meta_mut(), K::FINALIZER) {
            info!("Adding finalizer {}", K::FINALIZER);
            record = self.store.update(&record).await?;
        }

        if record.external_name().is_empty() {
            create::run(self, record, client.as_ref()).await
        } else {
            sync::run(self, record, client.as_ref()).await
        }
    }

    /// Record a Failed condition and decide whether to retry
    async fn fail(
        &self,
        mut record: K,
        reason: FailureReason,
        message: String,
        retry: bool,
    ) -> Result<ReconcileOutcome, ReconcilerError> {
        warn!(reason = %reason, retry, "{}", message);
        crate::observability::metrics::increment_reconcile_failures(reason.as_str());

        let before = current_status(&record);
        record.status_mut().set_failed(reason, message);
        self.write_status(record, &before).await?;

        Ok(if retry {
            ReconcileOutcome::Retry
        } else {
            ReconcileOutcome::Done
        })
    }

    /// Persist the status unless it equals `before`
    async fn write_status(&self, record: K, before: &ResourceStatus) -> Result<K, ReconcilerError> {
        if current_status(&record) == *before {
            debug!("status unchanged, skipping write");
            return Ok(record);
        }
        Ok(self.store.update_status(&record).await?)
    }
}

fn current_status<K: ManagedResource>(record: &K) -> ResourceStatus {
    record.status().cloned().unwrap_or_default()
}

/// Metric label for the result of an external call
fn operation_result<T>(result: &Result<T, ExternalError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(ExternalError::NotFound(_)) => "not_found",
        Err(ExternalError::AlreadyExists(_)) => "already_exists",
        Err(ExternalError::BadRequest(_)) => "bad_request",
        Err(ExternalError::Transient(_)) => "error",
    }
}
