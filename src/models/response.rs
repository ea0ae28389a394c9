use serde::{Deserialize, Serialize};

use crate::{messages::UserMessage, models::outcome::DispatchSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message,
        }
    }

    pub fn error(error: String, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            message,
        }
    }
}

/// Body returned for a processed document event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReport {
    pub summary: DispatchSummary,
    pub messages: Vec<UserMessage>,
}
