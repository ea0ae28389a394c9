use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use whatsapp_notifier::{
    clients::gateway::GatewayClient,
    config::NotificationSettings,
    models::{
        document::DocumentRef,
        event::NotificationEvent,
        gateway::{ApiKey, GatewayPayload},
        rule::{NotificationRule, ResolvedDestination},
    },
    notifier::dispatcher::Dispatcher,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, method},
};

use crate::common::{SHARE_KEY, StaticLinks, TEST_API_KEY, received_payloads, rule};

fn settings_for(server: &MockServer, timeout: Duration) -> NotificationSettings {
    NotificationSettings {
        gateway_url: server.uri(),
        api_key: ApiKey::new(TEST_API_KEY),
        request_timeout: timeout,
    }
}

fn sales_order() -> DocumentRef {
    DocumentRef {
        doctype: "SalesOrder".to_string(),
        name: "SO-001".to_string(),
        share_key: None,
    }
}

fn campaign_rule(send_media: bool) -> NotificationRule {
    let mut r = rule("order-confirmation", "SalesOrder", NotificationEvent::Submit);
    r.campaign = "order_confirmation".to_string();
    r.send_media = send_media;
    r
}

fn destinations(numbers: &[&str]) -> Vec<ResolvedDestination> {
    numbers
        .iter()
        .enumerate()
        .map(|(i, number)| ResolvedDestination {
            number: number.to_string(),
            username: format!("User {}", i + 1),
        })
        .collect()
}

async fn mount_success(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(server)
        .await;
}

/// Test: One failing destination does not stop the others
#[tokio::test]
async fn test_failed_destination_does_not_block_others() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "destination": "+2000" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_success(&server).await;

    let settings = settings_for(&server, Duration::from_secs(2));
    let gateway = GatewayClient::new(&settings)?;
    let dispatcher = Dispatcher::new(&gateway, &settings.api_key, &StaticLinks);

    let outcomes = dispatcher
        .dispatch(
            &campaign_rule(false),
            &destinations(&["+1000", "+2000", "+3000"]),
            &["SO-001".to_string()],
            &sales_order(),
        )
        .await?;

    let success: Vec<bool> = outcomes.iter().map(|o| o.success).collect();
    assert_eq!(success, vec![true, false, true]);
    assert_eq!(outcomes[1].destination.number, "+2000");
    assert_eq!(outcomes[1].status_code, Some(500));
    assert_eq!(outcomes[1].error_detail.as_deref(), Some("upstream exploded"));
    assert_eq!(outcomes[0].status_code, Some(200));
    assert!(outcomes.iter().all(|o| o.rule == "order-confirmation"));

    assert_eq!(received_payloads(&server).await?.len(), 3);

    Ok(())
}

/// Test: Media references carry document type, identifier and share key
#[tokio::test]
async fn test_media_reference_included_when_enabled() -> Result<()> {
    let server = MockServer::start().await;
    mount_success(&server).await;

    let settings = settings_for(&server, Duration::from_secs(2));
    let gateway = GatewayClient::new(&settings)?;
    let dispatcher = Dispatcher::new(&gateway, &settings.api_key, &StaticLinks);

    dispatcher
        .dispatch(
            &campaign_rule(true),
            &destinations(&["+1000"]),
            &[],
            &sales_order(),
        )
        .await?;

    let payloads = received_payloads(&server).await?;
    assert_eq!(payloads.len(), 1);

    let url = payloads[0]["media"]["url"].as_str().unwrap_or_default();
    assert!(url.starts_with(
        "https://erp.example.com/api/method/frappe.utils.print_format.download_pdf?"
    ));
    assert!(url.contains("doctype=SalesOrder"));
    assert!(url.contains("name=SO-001"));
    assert!(url.contains(&format!("key={}", SHARE_KEY)));
    assert_eq!(payloads[0]["media"]["filename"], json!("SO-001"));

    Ok(())
}

/// Test: No media field is sent when the rule does not ask for it
#[tokio::test]
async fn test_media_reference_omitted_when_disabled() -> Result<()> {
    let server = MockServer::start().await;
    mount_success(&server).await;

    let settings = settings_for(&server, Duration::from_secs(2));
    let gateway = GatewayClient::new(&settings)?;
    let dispatcher = Dispatcher::new(&gateway, &settings.api_key, &StaticLinks);

    dispatcher
        .dispatch(
            &campaign_rule(false),
            &destinations(&["+1000"]),
            &["a".to_string(), "b".to_string()],
            &sales_order(),
        )
        .await?;

    let payloads = received_payloads(&server).await?;
    assert_eq!(payloads.len(), 1);
    assert!(payloads[0].get("media").is_none());
    assert_eq!(
        payloads[0],
        json!({
            "apiKey": TEST_API_KEY,
            "campaignName": "order_confirmation",
            "destination": "+1000",
            "userName": "User 1",
            "templateParams": ["a", "b"]
        })
    );

    Ok(())
}

/// Test: A 200 response that reports failure in its body is a delivery failure
#[tokio::test]
async fn test_gateway_reported_error_is_a_failure() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": false, "message": "Campaign not live" })),
        )
        .mount(&server)
        .await;

    let settings = settings_for(&server, Duration::from_secs(2));
    let gateway = GatewayClient::new(&settings)?;

    let outcome = Dispatcher::new(&gateway, &settings.api_key, &StaticLinks)
        .dispatch(&campaign_rule(false), &destinations(&["+1000"]), &[], &sales_order())
        .await?;

    assert!(!outcome[0].success);
    assert_eq!(outcome[0].status_code, Some(200));
    assert_eq!(outcome[0].error_detail.as_deref(), Some("Campaign not live"));

    Ok(())
}

/// Test: A slow gateway times out for that destination only
#[tokio::test]
async fn test_slow_gateway_times_out_as_delivery_failure() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "destination": "+1000" })))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_success(&server).await;

    let settings = settings_for(&server, Duration::from_millis(300));
    let gateway = GatewayClient::new(&settings)?;

    let outcomes = Dispatcher::new(&gateway, &settings.api_key, &StaticLinks)
        .dispatch(
            &campaign_rule(false),
            &destinations(&["+1000", "+2000"]),
            &[],
            &sales_order(),
        )
        .await?;

    assert!(!outcomes[0].success);
    assert_eq!(outcomes[0].status_code, None);
    assert!(
        outcomes[0]
            .error_detail
            .as_deref()
            .is_some_and(|detail| detail.contains("timed out"))
    );
    assert!(outcomes[1].success);

    Ok(())
}

/// Test: An unreachable gateway is recorded per destination
#[tokio::test]
async fn test_unreachable_gateway_is_recorded() -> Result<()> {
    let settings = NotificationSettings {
        gateway_url: "http://127.0.0.1:1/campaign".to_string(),
        api_key: ApiKey::new(TEST_API_KEY),
        request_timeout: Duration::from_secs(2),
    };
    let gateway = GatewayClient::new(&settings)?;

    let outcomes = Dispatcher::new(&gateway, &settings.api_key, &StaticLinks)
        .dispatch(
            &campaign_rule(false),
            &destinations(&["+1000", "+2000"]),
            &[],
            &sales_order(),
        )
        .await?;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| !o.success && o.status_code.is_none()));

    Ok(())
}

/// Test: The credential never shows up in debug output
#[test]
fn test_payload_debug_redacts_api_key() -> Result<()> {
    let payload = GatewayPayload {
        api_key: ApiKey::new(TEST_API_KEY),
        campaign_name: "order_confirmation".to_string(),
        destination: "+1555".to_string(),
        user_name: "Jane".to_string(),
        template_params: vec!["SO-001".to_string()],
        media: None,
    };

    let debug = format!("{:?}", payload);
    assert!(!debug.contains(TEST_API_KEY));
    assert!(debug.contains("[redacted]"));

    let wire = serde_json::to_value(&payload)?;
    assert_eq!(wire["apiKey"], json!(TEST_API_KEY));

    Ok(())
}
