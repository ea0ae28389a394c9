//! User-facing progress and result messages derived from a dispatch summary.

use serde::{Deserialize, Serialize};

use crate::models::{
    outcome::{DeliveryOutcome, DispatchSummary},
    status::DispatchStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMessage {
    pub level: MessageLevel,
    pub text: String,
}

impl UserMessage {
    fn info(text: String) -> Self {
        Self {
            level: MessageLevel::Info,
            text,
        }
    }

    fn error(text: String) -> Self {
        Self {
            level: MessageLevel::Error,
            text,
        }
    }
}

pub fn user_messages(summary: &DispatchSummary) -> Vec<UserMessage> {
    if summary.status == DispatchStatus::Skipped {
        return Vec::new();
    }

    let name = &summary.document.name;
    let mut messages = Vec::new();

    if !summary.matched_rules.is_empty() {
        messages.push(UserMessage::info(format!(
            "Sending WhatsApp notification for {}",
            name
        )));
    }

    messages.extend(
        summary
            .rule_failures
            .iter()
            .map(|failure| UserMessage::error(failure.message.clone())),
    );

    messages.extend(
        summary
            .outcomes
            .iter()
            .filter(|outcome| !outcome.success)
            .map(|outcome| {
                UserMessage::error(format!(
                    "Error sending notification: {}",
                    delivery_error(outcome)
                ))
            }),
    );

    if summary.is_success() {
        messages.push(UserMessage::info(format!(
            "WhatsApp notification sent successfully for {}",
            name
        )));
    }

    messages
}

/// The captured gateway detail, or the HTTP status when the body was empty.
fn delivery_error(outcome: &DeliveryOutcome) -> String {
    match (outcome.error_detail.as_deref().map(str::trim), outcome.status_code) {
        (Some(detail), _) if !detail.is_empty() => detail.to_string(),
        (_, Some(status_code)) => format!("gateway returned HTTP {}", status_code),
        _ => "unknown error".to_string(),
    }
}
