//! # Finalizers
//!
//! Set semantics over `metadata.finalizers`: adding a present token and removing an
//! absent one are both no-ops. Both mutators report whether the list changed.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

pub fn has_finalizer(meta: &ObjectMeta, token: &str) -> bool {
    meta.finalizers
        .as_ref()
        .is_some_and(|finalizers| finalizers.iter().any(|f| f == token))
}

pub fn add_finalizer(meta: &mut ObjectMeta, token: &str) -> bool {
    if has_finalizer(meta, token) {
        return false;
    }
    meta.finalizers
        .get_or_insert_with(Vec::new)
        .push(token.to_string());
    true
}

pub fn remove_finalizer(meta: &mut ObjectMeta, token: &str) -> bool {
    let Some(finalizers) = meta.finalizers.as_mut() else {
        return false;
    };
    let before = finalizers.len();
    finalizers.retain(|f| f != token);
    before != finalizers.len()
}
