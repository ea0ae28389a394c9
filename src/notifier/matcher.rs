use anyhow::{Error, Result};
use tracing::{debug, warn};

use crate::{
    clients::rules::RuleRepository,
    error::NotifyError,
    expression::{self, is_truthy},
    models::{
        document::EvaluationContext, event::NotificationEvent, outcome::RuleFailure,
        rule::NotificationRule,
    },
};

#[derive(Debug, Default)]
pub struct MatchResult {
    /// Fully loaded rules whose condition held, in repository order.
    pub matched: Vec<NotificationRule>,
    pub failures: Vec<RuleFailure>,
}

/// Selects the rules that apply to one event.
///
/// A broken condition or a rule that fails to load is recorded as a failure
/// for that rule only; the remaining candidates are still considered.
pub fn match_rules(
    repository: &dyn RuleRepository,
    event: NotificationEvent,
    document_type: &str,
    context: &EvaluationContext,
) -> Result<MatchResult, Error> {
    let candidates = repository.list_candidates(event, document_type)?;
    debug!(
        %event,
        document_type,
        candidates = candidates.len(),
        "Matching notification rules"
    );

    let mut result = MatchResult::default();

    for candidate in candidates {
        if let Some(condition) = candidate.active_condition() {
            match expression::evaluate(condition, context) {
                Ok(value) if is_truthy(&value) => {}
                Ok(_) => {
                    debug!(rule = %candidate.name, condition, "Condition not met");
                    continue;
                }
                Err(source) => {
                    let error = NotifyError::RuleEvaluation {
                        rule: candidate.display_title().to_string(),
                        subject: "condition".to_string(),
                        source,
                    };
                    warn!(rule = %candidate.name, error = %error, "Rule condition failed");
                    result.failures.push(RuleFailure::new(
                        &candidate.name,
                        candidate.display_title(),
                        &error,
                    ));
                    continue;
                }
            }
        }

        match repository.hydrate(&candidate.name) {
            Ok(rule) => result.matched.push(rule),
            Err(e) => {
                let error = NotifyError::Repository {
                    rule: candidate.display_title().to_string(),
                    reason: e.to_string(),
                };
                warn!(rule = %candidate.name, error = %error, "Failed to load matched rule");
                result.failures.push(RuleFailure::new(
                    &candidate.name,
                    candidate.display_title(),
                    &error,
                ));
            }
        }
    }

    Ok(result)
}
