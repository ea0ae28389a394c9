use anyhow::{Result, anyhow};

use crate::models::document::DocumentRef;

/// Issues authenticated download links for rendered documents.
pub trait DocumentLinks: Send + Sync {
    fn base_url(&self) -> &str;

    /// A share key granting time-bounded access to `document`.
    fn share_key(&self, document: &DocumentRef) -> Result<String>;
}

/// Links rooted at the configured site URL, signed with the share key the
/// host sent along with the document event.
#[derive(Debug, Clone)]
pub struct SiteLinks {
    site_url: String,
}

impl SiteLinks {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
        }
    }
}

impl DocumentLinks for SiteLinks {
    fn base_url(&self) -> &str {
        &self.site_url
    }

    fn share_key(&self, document: &DocumentRef) -> Result<String> {
        document
            .share_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                anyhow!(
                    "No share key was issued for {} {}",
                    document.doctype,
                    document.name
                )
            })
    }
}
