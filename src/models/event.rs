use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// Lifecycle transition that can trigger notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationEvent {
    Save,
    Submit,
    Cancel,
}

impl NotificationEvent {
    /// Maps the host's named lifecycle hooks onto a trigger.
    pub fn from_lifecycle(name: &str) -> Option<Self> {
        match name {
            "document-saved" => Some(NotificationEvent::Save),
            "document-submitted" => Some(NotificationEvent::Submit),
            "document-cancelled" => Some(NotificationEvent::Cancel),
            _ => None,
        }
    }

    /// Maps a numeric document status (draft, submitted, cancelled) onto a trigger.
    pub fn from_docstatus(docstatus: i64) -> Option<Self> {
        match docstatus {
            0 => Some(NotificationEvent::Save),
            1 => Some(NotificationEvent::Submit),
            2 => Some(NotificationEvent::Cancel),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationEvent::Save => "Save",
            NotificationEvent::Submit => "Submit",
            NotificationEvent::Cancel => "Cancel",
        }
    }
}

impl Display for NotificationEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}
