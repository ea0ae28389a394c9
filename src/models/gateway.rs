use std::fmt::{Debug, Formatter, Result as FmtResult};

use anyhow::{Result, anyhow};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::models::document::DocumentRef;

/// Path of the host's rendered-document download endpoint.
pub const DOWNLOAD_PATH: &str = "/api/method/frappe.utils.print_format.download_pdf";

/// Gateway credential. Serializes as the raw key but never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("[redacted]")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayload {
    pub api_key: ApiKey,
    pub campaign_name: String,
    pub destination: String,
    pub user_name: String,
    pub template_params: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReference {
    pub url: String,
    pub filename: String,
}

impl MediaReference {
    /// Builds an authenticated download link for the document's rendered PDF.
    pub fn for_document(base_url: &str, document: &DocumentRef, share_key: &str) -> Result<Self> {
        if share_key.is_empty() {
            return Err(anyhow!("Share key for {} is empty", document.name));
        }

        let mut url = Url::parse(&format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            DOWNLOAD_PATH
        ))
        .map_err(|e| anyhow!("Invalid site URL '{}': {}", base_url, e))?;

        url.query_pairs_mut()
            .append_pair("doctype", &document.doctype)
            .append_pair("name", &document.name)
            .append_pair("key", share_key);

        Ok(Self {
            url: url.to_string(),
            filename: document.name.clone(),
        })
    }
}

/// The parts of a gateway reply that can signal failure on an HTTP 200.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayResponse {
    pub success: Option<bool>,
    pub message: Option<String>,
}
