use serde::{Deserialize, Serialize};

use crate::models::event::NotificationEvent;

/// The cheap projection of a rule used while matching, before its
/// destinations and parameters are loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCandidate {
    pub name: String,

    #[serde(default)]
    pub title: String,

    pub condition: Option<String>,
    pub campaign: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRule {
    pub name: String,

    #[serde(default)]
    pub title: String,

    pub document_type: String,
    pub event: NotificationEvent,

    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    #[serde(default)]
    pub condition: Option<String>,

    pub campaign: String,

    #[serde(default, alias = "send_pdf")]
    pub send_media: bool,

    #[serde(default)]
    pub destinations: Vec<DestinationSpec>,

    #[serde(default, alias = "params")]
    pub parameters: Vec<ParameterSpec>,
}

fn enabled_by_default() -> bool {
    true
}

impl NotificationRule {
    /// Title shown in user-facing messages, falling back to the rule name.
    pub fn display_title(&self) -> &str {
        display_title(&self.name, &self.title)
    }

    /// The condition, if one is set and non-blank.
    pub fn active_condition(&self) -> Option<&str> {
        active_condition(self.condition.as_deref())
    }

    pub fn candidate(&self) -> RuleCandidate {
        RuleCandidate {
            name: self.name.clone(),
            title: self.title.clone(),
            condition: self.condition.clone(),
            campaign: self.campaign.clone(),
        }
    }
}

impl RuleCandidate {
    pub fn display_title(&self) -> &str {
        display_title(&self.name, &self.title)
    }

    pub fn active_condition(&self) -> Option<&str> {
        active_condition(self.condition.as_deref())
    }
}

fn display_title<'a>(name: &'a str, title: &'a str) -> &'a str {
    if title.trim().is_empty() {
        name
    } else {
        title
    }
}

fn active_condition(condition: Option<&str>) -> Option<&str> {
    condition.map(str::trim).filter(|c| !c.is_empty())
}

/// Expressions yielding one recipient's phone number and display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSpec {
    #[serde(alias = "destination_no_field")]
    pub number: String,

    #[serde(alias = "destination_user")]
    pub username: String,
}

/// Expression yielding one positional template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    #[serde(alias = "parameter_field")]
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDestination {
    pub number: String,
    pub username: String,
}
