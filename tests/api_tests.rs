use std::sync::Arc;

use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use whatsapp_notifier::{
    api::{AppState, router},
    clients::rules::{FileRuleRepository, RuleRepository},
    config::Config,
    models::{
        event::NotificationEvent,
        rule::{NotificationRule, RuleCandidate},
    },
};
use wiremock::{Mock, MockServer, ResponseTemplate, matchers::method};

use crate::common::{config_for, destination, parameter, received_payloads, rule};

/// Repository whose backing store is down.
struct UnavailableRepository;

impl RuleRepository for UnavailableRepository {
    fn list_candidates(
        &self,
        _event: NotificationEvent,
        _document_type: &str,
    ) -> Result<Vec<RuleCandidate>> {
        Err(anyhow!("rule store unavailable"))
    }

    fn hydrate(&self, name: &str) -> Result<NotificationRule> {
        Err(anyhow!("rule '{}' unavailable", name))
    }

    fn rule_count(&self) -> usize {
        1
    }
}

async fn spawn_server(config: Config, repository: Arc<dyn RuleRepository>) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    let app = router(Arc::new(AppState::new(config, repository)));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{}", address))
}

fn delivery_rule() -> NotificationRule {
    let mut r = rule("delivery-note", "DeliveryNote", NotificationEvent::Submit);
    r.destinations = vec![destination("mobile_no", "customer")];
    r.parameters = vec![parameter("name")];
    r
}

/// Test: Posting a document event returns the dispatch summary and messages
#[tokio::test]
async fn test_event_endpoint_dispatches() -> Result<()> {
    let gateway = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&gateway)
        .await;

    let repository = Arc::new(FileRuleRepository::from_rules(vec![delivery_rule()])?);
    let base = spawn_server(config_for(&gateway.uri()), repository).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/events", base))
        .json(&json!({
            "doctype": "DeliveryNote",
            "name": "DN-0007",
            "docstatus": 1,
            "fields": { "mobile_no": "+44700900", "customer": "Northwind" }
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("Document event processed: success"));
    assert_eq!(body["data"]["summary"]["status"], json!("success"));
    assert_eq!(body["data"]["summary"]["event"], json!("Submit"));
    assert_eq!(
        body["data"]["messages"][1]["text"],
        json!("WhatsApp notification sent successfully for DN-0007")
    );

    let payloads = received_payloads(&gateway).await?;
    assert_eq!(payloads[0]["destination"], json!("+44700900"));
    assert_eq!(payloads[0]["templateParams"], json!(["DN-0007"]));

    Ok(())
}

/// Test: Events are skipped when notifications are disabled
#[tokio::test]
async fn test_event_endpoint_skips_when_disabled() -> Result<()> {
    let mut config = config_for("http://127.0.0.1:1");
    config.whatsapp_enabled = false;
    let repository = Arc::new(FileRuleRepository::from_rules(vec![delivery_rule()])?);
    let base = spawn_server(config, repository).await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/events", base))
        .json(&json!({
            "doctype": "DeliveryNote",
            "name": "DN-0008",
            "event": "document-submitted",
            "fields": { "mobile_no": "+44700900", "customer": "Northwind" }
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["data"]["summary"]["status"], json!("skipped"));
    assert_eq!(body["data"]["messages"], json!([]));

    Ok(())
}

/// Test: Out-of-range document statuses are skipped rather than rejected
#[tokio::test]
async fn test_event_endpoint_skips_unknown_docstatus() -> Result<()> {
    let repository = Arc::new(FileRuleRepository::from_rules(vec![delivery_rule()])?);
    let base = spawn_server(config_for("http://127.0.0.1:1"), repository).await?;
    let client = reqwest::Client::new();

    for docstatus in [-1, 300] {
        let response = client
            .post(format!("{}/api/v1/events", base))
            .json(&json!({
                "doctype": "DeliveryNote",
                "name": "DN-0010",
                "docstatus": docstatus,
                "fields": { "mobile_no": "+44700900", "customer": "Northwind" }
            }))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await?;
        assert_eq!(body["data"]["summary"]["status"], json!("skipped"));
    }

    Ok(())
}

/// Test: A rule store failure surfaces as a server error
#[tokio::test]
async fn test_event_endpoint_reports_repository_failure() -> Result<()> {
    let base = spawn_server(
        config_for("http://127.0.0.1:1"),
        Arc::new(UnavailableRepository),
    )
    .await?;

    let response = reqwest::Client::new()
        .post(format!("{}/api/v1/events", base))
        .json(&json!({
            "doctype": "DeliveryNote",
            "name": "DN-0009",
            "event": "document-submitted"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json().await?;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("rule store unavailable"));

    Ok(())
}

/// Test: Health reports component status and fails when the gateway is unusable
#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let repository: Arc<dyn RuleRepository> =
        Arc::new(FileRuleRepository::from_rules(vec![delivery_rule()])?);

    let healthy = spawn_server(config_for("http://127.0.0.1:1"), repository.clone()).await?;
    let response = reqwest::get(format!("{}/health", healthy)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["status"], json!("healthy"));
    assert_eq!(body["checks"]["rules"]["status"], json!("healthy"));

    let mut misconfigured = config_for("http://127.0.0.1:1");
    misconfigured.gateway_api_key = None;
    let unhealthy = spawn_server(misconfigured, repository).await?;
    let response = reqwest::get(format!("{}/health", unhealthy)).await?;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await?;
    assert_eq!(body["checks"]["gateway"]["status"], json!("unhealthy"));

    Ok(())
}
