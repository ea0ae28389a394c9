use futures_util::future::join_all;
use tracing::{info, warn};

use crate::{
    clients::{gateway::GatewayClient, links::DocumentLinks},
    error::NotifyError,
    models::{
        document::DocumentRef,
        gateway::{ApiKey, GatewayPayload, MediaReference},
        outcome::DeliveryOutcome,
        rule::{NotificationRule, ResolvedDestination},
    },
};

/// Sends one gateway request per resolved destination.
pub struct Dispatcher<'a> {
    gateway: &'a GatewayClient,
    api_key: &'a ApiKey,
    links: &'a dyn DocumentLinks,
}

impl<'a> Dispatcher<'a> {
    pub fn new(gateway: &'a GatewayClient, api_key: &'a ApiKey, links: &'a dyn DocumentLinks) -> Self {
        Self {
            gateway,
            api_key,
            links,
        }
    }

    /// Delivers `rule` to every destination concurrently and returns one outcome
    /// per destination, in destination order.
    ///
    /// Fails only when the media reference cannot be built, in which case
    /// nothing is sent.
    pub async fn dispatch(
        &self,
        rule: &NotificationRule,
        destinations: &[ResolvedDestination],
        parameters: &[String],
        document: &DocumentRef,
    ) -> Result<Vec<DeliveryOutcome>, NotifyError> {
        let media = if rule.send_media {
            Some(self.media_reference(rule, document)?)
        } else {
            None
        };

        let attempts = destinations
            .iter()
            .map(|destination| self.deliver(rule, destination, parameters, media.clone()));

        Ok(join_all(attempts).await)
    }

    fn media_reference(
        &self,
        rule: &NotificationRule,
        document: &DocumentRef,
    ) -> Result<MediaReference, NotifyError> {
        let media_error = |reason: String| NotifyError::Media {
            rule: rule.display_title().to_string(),
            reason,
        };

        let share_key = self
            .links
            .share_key(document)
            .map_err(|e| media_error(e.to_string()))?;

        MediaReference::for_document(self.links.base_url(), document, &share_key)
            .map_err(|e| media_error(e.to_string()))
    }

    async fn deliver(
        &self,
        rule: &NotificationRule,
        destination: &ResolvedDestination,
        parameters: &[String],
        media: Option<MediaReference>,
    ) -> DeliveryOutcome {
        let payload = GatewayPayload {
            api_key: self.api_key.clone(),
            campaign_name: rule.campaign.clone(),
            destination: destination.number.clone(),
            user_name: destination.username.clone(),
            template_params: parameters.to_vec(),
            media,
        };

        match self.gateway.send(&payload).await {
            Ok(status_code) => {
                info!(
                    rule = %rule.name,
                    destination = %destination.number,
                    status_code,
                    "WhatsApp notification delivered"
                );
                DeliveryOutcome::delivered(&rule.name, destination.clone(), status_code)
            }
            Err(failure) => {
                let error = NotifyError::Delivery {
                    destination: destination.number.clone(),
                    detail: failure.detail.clone(),
                };
                warn!(
                    rule = %rule.name,
                    status_code = ?failure.status_code,
                    error = %error,
                    "WhatsApp notification failed"
                );
                DeliveryOutcome::failed(
                    &rule.name,
                    destination.clone(),
                    failure.status_code,
                    failure.detail,
                )
            }
        }
    }
}
