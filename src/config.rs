use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use dotenvy::dotenv;
use serde::Deserialize;

use crate::{error::NotifyError, models::gateway::ApiKey};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default)]
    pub whatsapp_enabled: bool,

    #[serde(default)]
    pub gateway_url: Option<String>,
    #[serde(default)]
    pub gateway_api_key: Option<ApiKey>,

    #[serde(default = "default_site_url")]
    pub site_url: String,

    #[serde(default = "default_rules_path")]
    pub rules_path: String,

    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_server_port")]
    pub server_port: u16,
}

fn default_site_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_rules_path() -> String {
    "rules.json".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    10
}

fn default_server_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, Error> {
        dotenv().ok();

        let config = envy::from_env::<Self>()
            .map_err(|e| anyhow!("Invalid or missing environmental variable: {}", e))?;
        Ok(config)
    }

    pub fn notification_settings(&self) -> Result<NotificationSettings, NotifyError> {
        NotificationSettings::from_config(self)
    }
}

/// Gateway settings for one event, validated from [`Config`].
#[derive(Clone, Debug)]
pub struct NotificationSettings {
    pub gateway_url: String,
    pub api_key: ApiKey,
    pub request_timeout: Duration,
}

impl NotificationSettings {
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        if !config.whatsapp_enabled {
            return Err(NotifyError::Configuration(
                "WhatsApp notifications are disabled".to_string(),
            ));
        }

        let gateway_url = config
            .gateway_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| NotifyError::Configuration("gateway URL is not set".to_string()))?;

        let api_key = config
            .gateway_api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| NotifyError::Configuration("gateway API key is not set".to_string()))?;

        Ok(Self {
            gateway_url: gateway_url.to_string(),
            api_key,
            request_timeout: Duration::from_secs(config.request_timeout_seconds.max(1)),
        })
    }
}
