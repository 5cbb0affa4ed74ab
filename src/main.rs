//! # Cloud Resource Controller
//!
//! A Kubernetes controller that provisions Google Cloud resources from declarative records.
//!
//! ## Overview
//!
//! 1. **Watching records** - `GkeCluster` and `CloudsqlInstance` resources in all namespaces
//! 2. **Provisioning** - creates the external resource under a name derived from the record uid
//! 3. **Polling** - requeues until GCP reports the resource as usable
//! 4. **Publishing** - writes a connection Secret (endpoint, credentials, certificates) owned by the record
//! 5. **Cleanup** - a finalizer holds the record until the external resource is deleted or retained
//!
//! ## Features
//!
//! - **Idempotent creates**: an already-existing external resource is adopted, not duplicated
//! - **Reclaim policies**: `Delete` tears down the external resource, `Retain` leaves it in place
//! - **Prometheus metrics**: exposed on `/metrics`
//! - **Health probes**: `/healthz` and `/readyz`

use anyhow::Result;
use cloud_resource_controller::runtime::{initialize, run_watch_loop};

#[tokio::main]
async fn main() -> Result<()> {
    let init_result = initialize().await?;
    run_watch_loop(init_result).await
}
