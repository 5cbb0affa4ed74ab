//! # Observability
//!
//! Prometheus metrics for the controller. Logging goes through `tracing`, configured at
//! startup in `runtime::initialization`.

pub mod metrics;
