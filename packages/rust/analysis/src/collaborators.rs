//! External collaborators the analyzers depend on.
//!
//! HTTP-backed implementations live in `startupintel-crawler`; tests use
//! in-memory fakes.

use async_trait::async_trait;
use startupintel_shared::{CompanyRecord, JobPosting, RepoMetadata, Result};

/// Fetches a page and returns its extracted plain text.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// `Ok(None)` when the page does not exist or has no text.
    async fn fetch_text(&self, url: &str) -> Result<Option<String>>;

    /// Raw markup of a page, for link discovery. Fetchers that only see text
    /// return `Ok(None)`.
    async fn fetch_html(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// A resolved code-hosting organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgIdentity {
    pub login: String,
}

impl OrgIdentity {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// Maps a company to its code-hosting organization.
#[async_trait]
pub trait OrgResolver: Send + Sync {
    async fn resolve(&self, record: &CompanyRecord) -> Result<Option<OrgIdentity>>;
}

/// Lists an organization's public repositories.
#[async_trait]
pub trait RepoFetcher: Send + Sync {
    async fn fetch_repos(&self, org: &OrgIdentity) -> Result<Vec<RepoMetadata>>;
}

/// Supplies open job postings for a company.
#[async_trait]
pub trait JobPostingSource: Send + Sync {
    async fn postings(&self, record: &CompanyRecord) -> Result<Vec<JobPosting>>;
}

/// Uses the postings the collector attached to the record.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordPostings;

#[async_trait]
impl JobPostingSource for RecordPostings {
    async fn postings(&self, record: &CompanyRecord) -> Result<Vec<JobPosting>> {
        Ok(record.job_postings.clone())
    }
}

/// A content fetcher that never finds anything. Useful for offline scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

#[async_trait]
impl ContentFetcher for NoContent {
    async fn fetch_text(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
