use tracing::debug;

use crate::{
    expression::{self, ExpressionError, is_truthy, to_display_string},
    models::{
        document::EvaluationContext,
        rule::{NotificationRule, ResolvedDestination},
    },
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parameter {} ({expression}): {error}", .position + 1)]
pub struct ParameterError {
    /// Zero-based position in the template parameter vector.
    pub position: usize,
    pub expression: String,
    pub error: ExpressionError,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub destinations: Vec<ResolvedDestination>,
    pub parameters: Vec<Result<String, ParameterError>>,
    /// False when no destination survived evaluation and deduplication.
    pub ok: bool,
}

impl Resolution {
    /// The template parameters in declaration order, or the first failure.
    pub fn template_params(&self) -> Result<Vec<String>, ParameterError> {
        self.parameters.iter().cloned().collect()
    }

    pub fn parameter_errors(&self) -> impl Iterator<Item = &ParameterError> {
        self.parameters.iter().filter_map(|p| p.as_ref().err())
    }
}

/// Computes the destinations and template parameters of a matched rule.
///
/// Destinations whose expressions fail or come out blank are skipped. Numbers
/// and usernames are trimmed, and the first destination to claim a number
/// keeps it.
pub fn resolve(rule: &NotificationRule, context: &EvaluationContext) -> Resolution {
    let mut destinations: Vec<ResolvedDestination> = Vec::new();

    for spec in &rule.destinations {
        let Some(number) = evaluate_text(&rule.name, &spec.number, context) else {
            continue;
        };
        let Some(username) = evaluate_text(&rule.name, &spec.username, context) else {
            continue;
        };

        if destinations.iter().any(|d| d.number == number) {
            debug!(rule = %rule.name, number = %number, "Duplicate destination dropped");
            continue;
        }

        destinations.push(ResolvedDestination { number, username });
    }

    let parameters = rule
        .parameters
        .iter()
        .enumerate()
        .map(|(position, spec)| {
            expression::evaluate(&spec.expression, context)
                .map(|value| to_display_string(&value))
                .map_err(|error| ParameterError {
                    position,
                    expression: spec.expression.clone(),
                    error,
                })
        })
        .collect();

    Resolution {
        ok: !destinations.is_empty(),
        destinations,
        parameters,
    }
}

fn evaluate_text(rule: &str, source: &str, context: &EvaluationContext) -> Option<String> {
    match expression::evaluate(source, context) {
        Ok(value) if is_truthy(&value) => {
            let text = to_display_string(&value).trim().to_string();
            (!text.is_empty()).then_some(text)
        }
        Ok(_) => None,
        Err(error) => {
            debug!(rule, expression = source, error = %error, "Destination expression failed");
            None
        }
    }
}
