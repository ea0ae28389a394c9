use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// Terminal state of one processed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Success,
    PartialFailure,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    Evaluation,
    NoDestination,
    Repository,
    Media,
    Delivery,
}

impl Display for DispatchStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            DispatchStatus::Success => write!(f, "success"),
            DispatchStatus::PartialFailure => write!(f, "partial_failure"),
            DispatchStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            FailureKind::Configuration => write!(f, "configuration"),
            FailureKind::Evaluation => write!(f, "evaluation"),
            FailureKind::NoDestination => write!(f, "no_destination"),
            FailureKind::Repository => write!(f, "repository"),
            FailureKind::Media => write!(f, "media"),
            FailureKind::Delivery => write!(f, "delivery"),
        }
    }
}
