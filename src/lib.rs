//! Cloud Resource Controller Library
//!
//! Core functionality for the Cloud Resource Controller: record kinds, the reconcile
//! engine, GCP provider clients, connection secret publishing and the controller runtime.
//! Unit tests live in the module files; scenario tests live under `tests/`.

pub mod config;
pub mod constants;
pub mod controller;
pub mod crd;
pub mod observability;
pub mod provider;
pub mod publisher;
pub mod runtime;
pub mod store;

// Re-export CRD types for convenience
pub use crd::*;
