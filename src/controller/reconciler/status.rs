//! # Status Tracking
//!
//! Condition bookkeeping for managed records. Exactly one of Creating, Ready and Failed is
//! present at a time; setting one replaces the others in the same mutation.

use super::types::FailureReason;
use crate::crd::{Condition, ResourceStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionType {
    Creating,
    Ready,
    Failed,
}

impl ConditionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "Creating",
            Self::Ready => "Ready",
            Self::Failed => "Failed",
        }
    }
}

const CONDITION_TRUE: &str = "True";
const REASON_CREATE_REQUESTED: &str = "CreateRequested";
const REASON_AVAILABLE: &str = "Available";

/// Condition mutations on a record status
pub trait StatusTracker {
    fn set_creating(&mut self, message: impl Into<String>);

    fn set_ready(&mut self, message: impl Into<String>);

    fn set_failed(&mut self, reason: FailureReason, message: impl Into<String>);

    /// The condition currently in effect, if any
    fn active_condition(&self) -> Option<&Condition>;

    fn is_condition(&self, condition_type: ConditionType) -> bool {
        self.active_condition()
            .is_some_and(|c| c.r#type == condition_type.as_str())
    }
}

impl ResourceStatus {
    fn replace_condition(&mut self, condition_type: ConditionType, reason: &str, message: String) {
        // Re-asserting the active condition keeps its transition time so an unchanged
        // status compares equal and no write is issued.
        let last_transition_time = self
            .conditions
            .iter()
            .find(|c| c.r#type == condition_type.as_str() && c.status == CONDITION_TRUE)
            .and_then(|c| c.last_transition_time.clone())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

        self.conditions = vec![Condition {
            r#type: condition_type.as_str().to_string(),
            status: CONDITION_TRUE.to_string(),
            last_transition_time: Some(last_transition_time),
            reason: Some(reason.to_string()),
            message: Some(message.clone()),
        }];
        self.message = message;
    }
}

impl StatusTracker for ResourceStatus {
    fn set_creating(&mut self, message: impl Into<String>) {
        self.replace_condition(ConditionType::Creating, REASON_CREATE_REQUESTED, message.into());
    }

    fn set_ready(&mut self, message: impl Into<String>) {
        self.replace_condition(ConditionType::Ready, REASON_AVAILABLE, message.into());
    }

    fn set_failed(&mut self, reason: FailureReason, message: impl Into<String>) {
        self.replace_condition(ConditionType::Failed, reason.as_str(), message.into());
    }

    fn active_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}
