//! In-memory collaborators for unit tests.

use std::collections::HashMap;

use async_trait::async_trait;
use startupintel_shared::{CompanyRecord, RepoMetadata, Result, StartupIntelError};

use crate::collaborators::{ContentFetcher, OrgIdentity, OrgResolver, RepoFetcher};

/// URL → page text (and optionally markup). Unknown URLs return `Ok(None)`.
#[derive(Default, Clone)]
pub struct PageMap {
    pages: HashMap<String, std::result::Result<String, String>>,
    markup: HashMap<String, String>,
}

impl PageMap {
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(text.to_string()));
        self
    }

    pub fn with_html(mut self, url: &str, html: &str) -> Self {
        self.markup.insert(url.to_string(), html.to_string());
        self
    }

    pub fn with_error(mut self, url: &str) -> Self {
        self.pages
            .insert(url.to_string(), Err(format!("{url}: connection reset")));
        self
    }
}

#[async_trait]
impl ContentFetcher for PageMap {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        match self.pages.get(url) {
            Some(Ok(text)) => Ok(Some(text.clone())),
            Some(Err(msg)) => Err(StartupIntelError::Network(msg.clone())),
            None => Ok(None),
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        Ok(self.markup.get(url).cloned())
    }
}

/// Resolves every company to the same organization (or none).
pub struct FixedOrg(pub Option<String>);

#[async_trait]
impl OrgResolver for FixedOrg {
    async fn resolve(&self, _record: &CompanyRecord) -> Result<Option<OrgIdentity>> {
        Ok(self.0.clone().map(OrgIdentity::new))
    }
}

/// Returns a fixed repository list, or a fixed error.
pub struct FixedRepos(std::result::Result<Vec<RepoMetadata>, String>);

impl FixedRepos {
    pub fn ok(repos: Vec<RepoMetadata>) -> Self {
        Self(Ok(repos))
    }

    pub fn failing(message: &str) -> Self {
        Self(Err(message.to_string()))
    }
}

#[async_trait]
impl RepoFetcher for FixedRepos {
    async fn fetch_repos(&self, _org: &OrgIdentity) -> Result<Vec<RepoMetadata>> {
        self.0.clone().map_err(StartupIntelError::Network)
    }
}
