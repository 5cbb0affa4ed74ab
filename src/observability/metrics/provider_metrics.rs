//! # Provider Metrics
//!
//! External API calls by record kind, operation and result.

use crate::observability::metrics::registry::REGISTRY;
use anyhow::Result;
use prometheus::IntCounterVec;
use std::sync::LazyLock;

static EXTERNAL_OPERATIONS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "cloud_resource_external_operations_total",
            "Total number of external API operations",
        ),
        &["kind", "operation", "result"],
    )
    .expect("Failed to create EXTERNAL_OPERATIONS_TOTAL metric - this should never happen")
});

pub(crate) fn register_provider_metrics() -> Result<()> {
    REGISTRY.register(Box::new(EXTERNAL_OPERATIONS_TOTAL.clone()))?;
    Ok(())
}

pub fn record_external_operation(kind: &str, operation: &str, result: &str) {
    EXTERNAL_OPERATIONS_TOTAL
        .with_label_values(&[kind, operation, result])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_external_operation() {
        let labels = ["GkeCluster", "create", "already_exists"];
        let before = EXTERNAL_OPERATIONS_TOTAL.with_label_values(&labels).get();
        record_external_operation("GkeCluster", "create", "already_exists");
        let after = EXTERNAL_OPERATIONS_TOTAL.with_label_values(&labels).get();
        assert_eq!(after, before + 1u64);
    }
}
