//! Event entry point: matches rules, resolves destinations and fans out
//! delivery for one document event.

pub mod dispatcher;
pub mod matcher;
pub mod resolver;

use std::sync::Arc;

use anyhow::{Error, Result};
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::{
    clients::{gateway::GatewayClient, links::DocumentLinks, rules::RuleRepository},
    config::{Config, NotificationSettings},
    error::NotifyError,
    models::{
        document::{DocumentEvent, DocumentRef, EvaluationContext},
        event::NotificationEvent,
        outcome::{DeliveryOutcome, DispatchSummary, RuleFailure},
        rule::NotificationRule,
    },
    notifier::{
        dispatcher::Dispatcher,
        matcher::{MatchResult, match_rules},
        resolver::resolve,
    },
};

#[derive(Clone)]
pub struct Notifier {
    repository: Arc<dyn RuleRepository>,
    links: Arc<dyn DocumentLinks>,
}

impl Notifier {
    pub fn new(repository: Arc<dyn RuleRepository>, links: Arc<dyn DocumentLinks>) -> Self {
        Self { repository, links }
    }

    /// Handles one document event end to end.
    ///
    /// Disabled or incomplete gateway settings and unmapped events are skipped
    /// silently. Only a failure to list candidate rules or to build the HTTP
    /// client is returned as an error; everything else ends up in the summary.
    pub async fn handle_event(
        &self,
        event: &DocumentEvent,
        config: &Config,
    ) -> Result<DispatchSummary, Error> {
        let document = event.document_ref();

        let settings = match NotificationSettings::from_config(config) {
            Ok(settings) => settings,
            Err(e) => {
                debug!(document = %document.name, reason = %e, "Skipping document event");
                return Ok(DispatchSummary::skipped(document, event.trigger()));
            }
        };

        let Some(trigger) = event.trigger() else {
            debug!(
                document = %document.name,
                event = ?event.event,
                docstatus = ?event.docstatus,
                "Document event has no notification trigger"
            );
            return Ok(DispatchSummary::skipped(document, None));
        };

        let gateway = GatewayClient::new(&settings)?;
        self.process(event, trigger, &settings, &gateway).await
    }

    /// Runs matching, resolution and dispatch with explicit settings.
    pub async fn process(
        &self,
        event: &DocumentEvent,
        trigger: NotificationEvent,
        settings: &NotificationSettings,
        gateway: &GatewayClient,
    ) -> Result<DispatchSummary, Error> {
        let document = event.document_ref();
        let context = event.context();

        let MatchResult {
            matched,
            mut failures,
        } = match_rules(
            self.repository.as_ref(),
            trigger,
            &document.doctype,
            &context,
        )?;

        if matched.is_empty() && failures.is_empty() {
            debug!(
                document = %document.name,
                event = %trigger,
                "No notification rules matched"
            );
            return Ok(DispatchSummary::skipped(document, Some(trigger)));
        }

        info!(
            document = %document.name,
            doctype = %document.doctype,
            event = %trigger,
            rules = matched.len(),
            "Sending WhatsApp notification"
        );

        let dispatcher = Dispatcher::new(gateway, &settings.api_key, self.links.as_ref());
        let deliveries = matched
            .iter()
            .map(|rule| deliver_rule(rule, &context, &dispatcher, &document));

        let mut outcomes = Vec::new();
        for result in join_all(deliveries).await {
            match result {
                Ok(rule_outcomes) => outcomes.extend(rule_outcomes),
                Err(failure) => failures.push(failure),
            }
        }

        let matched_names = matched.into_iter().map(|rule| rule.name).collect();
        let summary =
            DispatchSummary::from_parts(document, trigger, matched_names, outcomes, failures);

        info!(
            document = %summary.document.name,
            status = %summary.status,
            delivered = summary.delivered_count(),
            failed = summary.failed_count(),
            rule_failures = summary.rule_failures.len(),
            "WhatsApp notification processing finished"
        );

        Ok(summary)
    }
}

async fn deliver_rule(
    rule: &NotificationRule,
    context: &EvaluationContext,
    dispatcher: &Dispatcher<'_>,
    document: &DocumentRef,
) -> Result<Vec<DeliveryOutcome>, RuleFailure> {
    let title = rule.display_title();
    let rule_failure = |error: NotifyError| {
        warn!(rule = %rule.name, error = %error, "Notification rule skipped");
        RuleFailure::new(&rule.name, title, &error)
    };

    let resolution = resolve(rule, context);
    if !resolution.ok {
        return Err(rule_failure(NotifyError::NoDestination {
            rule: title.to_string(),
        }));
    }

    // Parameters are positional, so a missing one would shift the rest.
    let parameters = resolution.template_params().map_err(|e| {
        rule_failure(NotifyError::RuleEvaluation {
            rule: title.to_string(),
            subject: format!("parameter {}", e.position + 1),
            source: e.error,
        })
    })?;

    dispatcher
        .dispatch(rule, &resolution.destinations, &parameters, document)
        .await
        .map_err(rule_failure)
}
