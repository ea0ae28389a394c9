use std::{fs, path::Path};

use anyhow::{Error, Result, anyhow};
use tracing::info;

use crate::models::{
    event::NotificationEvent,
    rule::{NotificationRule, RuleCandidate},
};

/// Source of notification rules.
///
/// Matching only needs the candidate projection; full rules are loaded with
/// [`RuleRepository::hydrate`] once a candidate's condition has passed.
pub trait RuleRepository: Send + Sync {
    /// Enabled rules for `document_type` and `event`, in repository order.
    fn list_candidates(
        &self,
        event: NotificationEvent,
        document_type: &str,
    ) -> Result<Vec<RuleCandidate>, Error>;

    fn hydrate(&self, name: &str) -> Result<NotificationRule, Error>;

    fn rule_count(&self) -> usize;
}

/// Rules read once from a JSON array and served in file order.
#[derive(Debug, Clone, Default)]
pub struct FileRuleRepository {
    rules: Vec<NotificationRule>,
}

impl FileRuleRepository {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read rules from {}: {}", path.display(), e))?;

        let repository = Self::from_json(&raw)?;

        info!(
            path = %path.display(),
            rules = repository.rules.len(),
            "Notification rules loaded"
        );

        Ok(repository)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let rules = serde_json::from_str::<Vec<NotificationRule>>(raw)
            .map_err(|e| anyhow!("Invalid notification rules: {}", e))?;
        Self::from_rules(rules)
    }

    pub fn from_rules(rules: Vec<NotificationRule>) -> Result<Self, Error> {
        for (i, rule) in rules.iter().enumerate() {
            if rules[..i].iter().any(|other| other.name == rule.name) {
                return Err(anyhow!("Duplicate notification rule '{}'", rule.name));
            }
            if rule.campaign.trim().is_empty() {
                return Err(anyhow!("Notification rule '{}' has no campaign", rule.name));
            }
        }

        Ok(Self { rules })
    }
}

impl RuleRepository for FileRuleRepository {
    fn list_candidates(
        &self,
        event: NotificationEvent,
        document_type: &str,
    ) -> Result<Vec<RuleCandidate>, Error> {
        Ok(self
            .rules
            .iter()
            .filter(|rule| {
                rule.enabled && rule.event == event && rule.document_type == document_type
            })
            .map(NotificationRule::candidate)
            .collect())
    }

    fn hydrate(&self, name: &str) -> Result<NotificationRule, Error> {
        self.rules
            .iter()
            .find(|rule| rule.name == name)
            .cloned()
            .ok_or_else(|| anyhow!("Notification rule '{}' not found", name))
    }

    fn rule_count(&self) -> usize {
        self.rules.len()
    }
}
