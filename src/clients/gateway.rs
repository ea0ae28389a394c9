use anyhow::{Error, Result, anyhow};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

use crate::{
    config::NotificationSettings,
    models::gateway::{GatewayPayload, GatewayResponse},
};

/// Why a single delivery attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub status_code: Option<u16>,
    pub detail: String,
}

impl DeliveryFailure {
    fn transport(error: reqwest::Error) -> Self {
        let detail = if error.is_timeout() {
            format!("Gateway request timed out: {}", error)
        } else {
            format!("Gateway request failed: {}", error)
        };

        Self {
            status_code: None,
            detail,
        }
    }
}

/// Thin HTTP client for the WhatsApp campaign gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http_client: Client,
    url: String,
}

impl GatewayClient {
    pub fn new(settings: &NotificationSettings) -> Result<Self, Error> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|_| anyhow!("Failed to create HTTP client"))?;

        info!(url = %settings.gateway_url, "Gateway client initialized");

        Ok(Self {
            http_client,
            url: settings.gateway_url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Makes exactly one delivery attempt. Returns the HTTP status on success.
    pub async fn send(&self, payload: &GatewayPayload) -> Result<u16, DeliveryFailure> {
        debug!(?payload, "Sending gateway request");

        let response = self
            .http_client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(DeliveryFailure::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(DeliveryFailure::transport)?;

        if status != StatusCode::OK {
            return Err(DeliveryFailure {
                status_code: Some(status.as_u16()),
                detail: body,
            });
        }

        let reply = serde_json::from_str::<GatewayResponse>(&body).unwrap_or_default();
        if reply.success == Some(false) {
            return Err(DeliveryFailure {
                status_code: Some(status.as_u16()),
                detail: reply.message.unwrap_or(body),
            });
        }

        Ok(status.as_u16())
    }
}
