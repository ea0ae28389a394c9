use std::sync::Arc;

use anyhow::Result;
use serde_json::{Map, Value};
use whatsapp_notifier::{
    clients::{links::DocumentLinks, rules::FileRuleRepository},
    config::Config,
    models::{
        document::{DocumentEvent, DocumentRef, EvaluationContext},
        event::NotificationEvent,
        gateway::ApiKey,
        rule::{DestinationSpec, NotificationRule, ParameterSpec},
    },
    notifier::Notifier,
};
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-secret-api-key";
pub const SITE_URL: &str = "https://erp.example.com";
pub const SHARE_KEY: &str = "share-key-123";

/// Links with a fixed share key so media URLs can be asserted exactly.
pub struct StaticLinks;

impl DocumentLinks for StaticLinks {
    fn base_url(&self) -> &str {
        SITE_URL
    }

    fn share_key(&self, _document: &DocumentRef) -> Result<String> {
        Ok(SHARE_KEY.to_string())
    }
}

pub fn config_for(gateway_url: &str) -> Config {
    Config {
        whatsapp_enabled: true,
        gateway_url: Some(gateway_url.to_string()),
        gateway_api_key: Some(ApiKey::new(TEST_API_KEY)),
        site_url: SITE_URL.to_string(),
        rules_path: "rules.json".to_string(),
        request_timeout_seconds: 2,
        server_port: 0,
    }
}

pub fn rule(name: &str, document_type: &str, event: NotificationEvent) -> NotificationRule {
    NotificationRule {
        name: name.to_string(),
        title: String::new(),
        document_type: document_type.to_string(),
        event,
        enabled: true,
        condition: None,
        campaign: format!("{}_campaign", name),
        send_media: false,
        destinations: Vec::new(),
        parameters: Vec::new(),
    }
}

pub fn destination(number: &str, username: &str) -> DestinationSpec {
    DestinationSpec {
        number: number.to_string(),
        username: username.to_string(),
    }
}

pub fn parameter(expression: &str) -> ParameterSpec {
    ParameterSpec {
        expression: expression.to_string(),
    }
}

pub fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

pub fn context(value: Value) -> EvaluationContext {
    EvaluationContext::new(fields(value))
}

pub fn document_event(doctype: &str, name: &str, event: &str, value: Value) -> DocumentEvent {
    DocumentEvent {
        doctype: doctype.to_string(),
        name: name.to_string(),
        event: Some(event.to_string()),
        docstatus: None,
        share_key: None,
        fields: fields(value),
    }
}

pub fn notifier(rules: Vec<NotificationRule>) -> Result<Notifier> {
    let repository = FileRuleRepository::from_rules(rules)?;
    Ok(Notifier::new(Arc::new(repository), Arc::new(StaticLinks)))
}

pub async fn received_payloads(server: &MockServer) -> Result<Vec<Value>> {
    let requests = server.received_requests().await.unwrap_or_default();
    let mut payloads = Vec::with_capacity(requests.len());
    for request in requests {
        payloads.push(request.body_json::<Value>()?);
    }
    Ok(payloads)
}
