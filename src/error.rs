use crate::{expression::ExpressionError, models::status::FailureKind};

/// Failures raised while handling one document event.
///
/// Every variant is recovered at the smallest scope it affects: a destination,
/// a rule, or (for `Configuration`) the whole event, which is then skipped.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NotifyError {
    #[error("notifications are not configured: {0}")]
    Configuration(String),

    #[error("{rule}: failed to evaluate {subject}: {source}")]
    RuleEvaluation {
        rule: String,
        subject: String,
        source: ExpressionError,
    },

    #[error("{rule}: No destination number found for notification")]
    NoDestination { rule: String },

    #[error("{rule}: failed to load notification: {reason}")]
    Repository { rule: String, reason: String },

    #[error("{rule}: failed to build media reference: {reason}")]
    Media { rule: String, reason: String },

    #[error("delivery to {destination} failed: {detail}")]
    Delivery { destination: String, detail: String },
}

impl NotifyError {
    pub fn kind(&self) -> FailureKind {
        match self {
            NotifyError::Configuration(_) => FailureKind::Configuration,
            NotifyError::RuleEvaluation { .. } => FailureKind::Evaluation,
            NotifyError::NoDestination { .. } => FailureKind::NoDestination,
            NotifyError::Repository { .. } => FailureKind::Repository,
            NotifyError::Media { .. } => FailureKind::Media,
            NotifyError::Delivery { .. } => FailureKind::Delivery,
        }
    }
}
