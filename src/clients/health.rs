use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::rules::RuleRepository,
    config::Config,
    models::health::{ComponentHealth, HealthCheckResponse, HealthStatus},
};

pub struct HealthChecker {
    config: Config,
    repository: Arc<dyn RuleRepository>,
}

impl HealthChecker {
    pub fn new(config: Config, repository: Arc<dyn RuleRepository>) -> Self {
        Self { config, repository }
    }

    pub fn check_all(&self) -> HealthCheckResponse {
        let mut checks = HashMap::new();

        checks.insert("gateway".to_string(), self.check_gateway());
        checks.insert("rules".to_string(), self.check_rules());

        let overall_status = self.determine_overall_status(&checks);

        HealthCheckResponse {
            status: overall_status,
            timestamp: Utc::now(),
            checks,
        }
    }

    fn check_gateway(&self) -> ComponentHealth {
        if !self.config.whatsapp_enabled {
            return ComponentHealth::degraded("WhatsApp notifications are disabled".to_string());
        }

        match self.config.notification_settings() {
            Ok(settings) => {
                debug!(url = %settings.gateway_url, "Gateway configuration check passed");
                ComponentHealth::healthy(format!(
                    "timeout {}s",
                    settings.request_timeout.as_secs()
                ))
            }
            Err(e) => {
                warn!(error = %e, "Gateway is enabled but not usable");
                ComponentHealth::unhealthy(e.to_string())
            }
        }
    }

    fn check_rules(&self) -> ComponentHealth {
        match self.repository.rule_count() {
            0 => ComponentHealth::degraded("no notification rules loaded".to_string()),
            count => ComponentHealth::healthy(format!("{} rules loaded", count)),
        }
    }

    fn determine_overall_status(&self, checks: &HashMap<String, ComponentHealth>) -> HealthStatus {
        if checks
            .values()
            .any(|health| health.status == HealthStatus::Unhealthy)
        {
            HealthStatus::Unhealthy
        } else if checks
            .values()
            .any(|health| health.status == HealthStatus::Degraded)
        {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
