//! # GCP Providers
//!
//! Clients for Google Cloud resources:
//! - GKE (container.googleapis.com v1): clusters
//! - Cloud SQL Admin (sqladmin.googleapis.com v1beta4): database instances
//!
//! Uses native REST implementations that:
//! - Work directly against HTTP mock servers (endpoints are configurable)
//! - Use reqwest with rustls (no OpenSSL dependencies)

mod cloudsql;
mod connector;
mod gke;
mod rest;

pub use cloudsql::CloudSqlClient;
pub use connector::{token_from_secret, GcpConnector};
pub use gke::GkeClusterClient;
