//! # Reconciler Types
//!
//! Outcome, failure reason and error types shared by the reconcile branches.

use crate::store::StoreError;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Scheduling signal returned to the dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Steady state; reconcile again only when the record changes
    Done,
    /// Try again soon, with the dispatcher's error backoff
    Retry,
    /// Try again after a fixed delay (external work is still in progress)
    RetryAfter(Duration),
}

impl ReconcileOutcome {
    /// Whether the dispatcher should re-invoke reconcile
    pub fn requeue(self) -> bool {
        !matches!(self, Self::Done)
    }

    /// Delay before the next invocation, when one is fixed
    pub fn requeue_after(self) -> Option<Duration> {
        match self {
            Self::RetryAfter(delay) => Some(delay),
            _ => None,
        }
    }
}

/// Reason recorded on the Failed condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    ClientConnectionFailed,
    CreateFailed,
    SyncFailed,
    ConnectionSecretFailed,
    DeleteFailed,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientConnectionFailed => "ClientConnectionFailed",
            Self::CreateFailed => "CreateFailed",
            Self::SyncFailed => "SyncFailed",
            Self::ConnectionSecretFailed => "ConnectionSecretFailed",
            Self::DeleteFailed => "DeleteFailed",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that escape reconcile
///
/// External, connection and publishing failures are turned into a Failed condition on the
/// record and never surface here. Only failing to persist the record does.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("failed to persist record: {0}")]
    Store(#[from] StoreError),
}

impl ReconcilerError {
    /// Whether the write lost a compare-and-swap race
    pub fn is_conflict(&self) -> bool {
        match self {
            Self::Store(e) => e.is_conflict(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_contract() {
        assert!(!ReconcileOutcome::Done.requeue());
        assert!(ReconcileOutcome::Retry.requeue());
        assert_eq!(ReconcileOutcome::Retry.requeue_after(), None);
        let delayed = ReconcileOutcome::RetryAfter(Duration::from_secs(30));
        assert!(delayed.requeue());
        assert_eq!(delayed.requeue_after(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_failure_reason_names() {
        assert_eq!(
            FailureReason::ClientConnectionFailed.to_string(),
            "ClientConnectionFailed"
        );
        assert_eq!(FailureReason::ConnectionSecretFailed.as_str(), "ConnectionSecretFailed");
    }
}
