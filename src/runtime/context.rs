//! # Controller Context
//!
//! Shared state handed to every reconcile of one record kind: the engine and the per-record
//! error backoff.

use crate::config::ControllerConfig;
use crate::controller::backoff::FibonacciBackoff;
use crate::controller::reconciler::ReconcileEngine;
use crate::crd::ManagedResource;
use crate::store::RecordKey;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

pub struct ControllerContext<K: ManagedResource> {
    pub engine: ReconcileEngine<K>,
    backoff_min_secs: u64,
    backoff_max_secs: u64,
    /// Backoff state tracked per record so failures do not slow down other records
    backoff_states: Mutex<HashMap<RecordKey, FibonacciBackoff>>,
}

impl<K: ManagedResource> std::fmt::Debug for ControllerContext<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerContext")
            .field("engine", &self.engine)
            .field("backoff_min_secs", &self.backoff_min_secs)
            .field("backoff_max_secs", &self.backoff_max_secs)
            .finish_non_exhaustive()
    }
}

impl<K: ManagedResource> ControllerContext<K> {
    pub fn new(engine: ReconcileEngine<K>, config: &ControllerConfig) -> Self {
        Self {
            engine,
            backoff_min_secs: config.error_backoff_min_secs,
            backoff_max_secs: config.error_backoff_max_secs,
            backoff_states: Mutex::new(HashMap::new()),
        }
    }

    /// Next backoff delay (seconds) and consecutive error count for `key`
    pub fn next_error_backoff(&self, key: &RecordKey) -> (u64, u32) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                let backoff = states.entry(key.clone()).or_insert_with(|| {
                    FibonacciBackoff::new(self.backoff_min_secs, self.backoff_max_secs)
                });
                let delay = backoff.next_backoff_seconds();
                (delay, backoff.error_count())
            }
            Err(e) => {
                warn!("Failed to lock backoff_states: {}, using minimum backoff", e);
                (self.backoff_min_secs, 0)
            }
        }
    }

    /// Restart the backoff sequence of `key` after a successful reconcile
    pub fn reset_backoff(&self, key: &RecordKey) {
        match self.backoff_states.lock() {
            Ok(mut states) => {
                if let Some(backoff) = states.get_mut(key) {
                    backoff.reset();
                }
            }
            Err(e) => warn!("Failed to lock backoff_states: {}", e),
        }
    }
}
