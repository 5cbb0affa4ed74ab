//! # Managed Resource
//!
//! The record view the reconcile engine is written against. Each record kind names its
//! finalizer, how its external name is derived, and where its status lives.

use super::{ProviderRef, ReclaimPolicy, ResourceStatus};
use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub trait ManagedResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Desired external configuration handed to the provider client on create
    type ExternalSpec: Send + Sync + 'static;

    /// Finalizer token guarding external cleanup
    const FINALIZER: &'static str;

    fn external_spec(&self) -> &Self::ExternalSpec;

    fn provider_ref(&self) -> &ProviderRef;

    fn reclaim_policy(&self) -> ReclaimPolicy;

    /// Zone or region passed to get/delete calls
    fn location_hint(&self) -> &str;

    /// Name for the external resource, derived from the record identity
    ///
    /// Deterministic so a retried create hits AlreadyExists instead of leaking a duplicate.
    fn derive_external_name(&self) -> String;

    /// Status message once the external resource is usable
    fn running_message(external_name: &str) -> String;

    fn status(&self) -> Option<&ResourceStatus>;

    fn status_mut(&mut self) -> &mut ResourceStatus;

    /// Recorded external name, empty when creation has not been requested yet
    fn external_name(&self) -> &str {
        self.status().map_or("", |s| s.external_name.as_str())
    }

    /// Stable identity used to derive external names; falls back to the record name
    /// when the API server has not assigned a uid.
    fn identity(&self) -> String {
        self.uid().unwrap_or_else(|| self.name_any())
    }
}
