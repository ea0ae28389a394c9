use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::NotifyError,
    models::{
        document::DocumentRef,
        event::NotificationEvent,
        rule::ResolvedDestination,
        status::{DispatchStatus, FailureKind},
    },
};

/// Result of the single delivery attempt made for one destination of one rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub rule: String,
    pub destination: ResolvedDestination,
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,

    pub attempted_at: DateTime<Utc>,
}

impl DeliveryOutcome {
    pub fn delivered(rule: &str, destination: ResolvedDestination, status_code: u16) -> Self {
        Self {
            rule: rule.to_string(),
            destination,
            success: true,
            status_code: Some(status_code),
            error_detail: None,
            attempted_at: Utc::now(),
        }
    }

    pub fn failed(
        rule: &str,
        destination: ResolvedDestination,
        status_code: Option<u16>,
        error_detail: String,
    ) -> Self {
        Self {
            rule: rule.to_string(),
            destination,
            success: false,
            status_code,
            error_detail: Some(error_detail),
            attempted_at: Utc::now(),
        }
    }
}

/// A rule that matched (or was being matched) but produced no deliveries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule: String,
    pub title: String,
    pub kind: FailureKind,
    pub message: String,
}

impl RuleFailure {
    pub fn new(rule: &str, title: &str, error: &NotifyError) -> Self {
        Self {
            rule: rule.to_string(),
            title: title.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSummary {
    pub document: DocumentRef,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<NotificationEvent>,

    pub status: DispatchStatus,
    pub matched_rules: Vec<String>,
    pub outcomes: Vec<DeliveryOutcome>,
    pub rule_failures: Vec<RuleFailure>,
    pub processed_at: DateTime<Utc>,
}

impl DispatchSummary {
    pub fn skipped(document: DocumentRef, event: Option<NotificationEvent>) -> Self {
        Self {
            document,
            event,
            status: DispatchStatus::Skipped,
            matched_rules: Vec::new(),
            outcomes: Vec::new(),
            rule_failures: Vec::new(),
            processed_at: Utc::now(),
        }
    }

    /// Aggregates one event's results.
    ///
    /// Nothing matched and nothing failed is `Skipped`. Otherwise the event is a
    /// `Success` only when at least one delivery was attempted, every attempt
    /// succeeded and no rule failed.
    pub fn from_parts(
        document: DocumentRef,
        event: NotificationEvent,
        matched_rules: Vec<String>,
        outcomes: Vec<DeliveryOutcome>,
        rule_failures: Vec<RuleFailure>,
    ) -> Self {
        let status = if matched_rules.is_empty() && rule_failures.is_empty() {
            DispatchStatus::Skipped
        } else if !outcomes.is_empty()
            && rule_failures.is_empty()
            && outcomes.iter().all(|outcome| outcome.success)
        {
            DispatchStatus::Success
        } else {
            DispatchStatus::PartialFailure
        };

        Self {
            document,
            event: Some(event),
            status,
            matched_rules,
            outcomes,
            rule_failures,
            processed_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == DispatchStatus::Success
    }

    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }
}
