//! # Controller
//!
//! The reconcile engine and the record-mutation helpers it is built from.
//!
//! - `reconciler` - per-record state machine (connect, create, sync, delete)
//! - `backoff` - Fibonacci backoff used by the runtime error policy
//! - `server` - metrics and probe endpoints

pub mod backoff;
pub mod reconciler;
pub mod server;
