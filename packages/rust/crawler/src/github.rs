//! GitHub REST API client: organization resolution and repository listing.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::{Client, StatusCode, header};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use startupintel_analysis::lexicon::VENDOR_ORGS;
use startupintel_analysis::{OrgIdentity, OrgResolver, RepoFetcher};
use startupintel_shared::{
    AppConfig, CompanyRecord, RepoMetadata, Result, StartupIntelError, github_token, website_url,
};

use crate::fetcher::{FetchOptions, HttpFetcher, build_client};

/// Repositories requested per page (the API maximum).
const PER_PAGE: usize = 100;

/// Name-derived organization guesses tried per company.
const MAX_NAME_CANDIDATES: usize = 10;

/// A user account with more public repositories than this is treated like an organization.
const MIN_USER_REPOS: u32 = 5;

static GITHUB_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)github\.com/([a-z0-9_-]+)").expect("valid github link pattern")
});

static LEGAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+(inc|corp|corporation|llc|ltd|limited)\.?$").expect("valid suffix pattern")
});

static ORG_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9\-_.]+$").expect("valid org name pattern"));

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GitHubOptions {
    pub api_base: String,
    pub token: Option<String>,
    /// Upper bound on repositories fetched per organization.
    pub max_repos: usize,
    /// Pause between repository pages.
    pub page_delay: Duration,
    pub fetch: FetchOptions,
}

impl GitHubOptions {
    /// Options from the application config, reading the token from its env var.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_base: config.github.api_base.trim_end_matches('/').to_string(),
            token: github_token(config),
            max_repos: config.github.max_repos,
            page_delay: Duration::from_millis(100),
            fetch: FetchOptions::from(&config.scraping),
        }
    }
}

// ---------------------------------------------------------------------------
// API payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiRepo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u32,
    #[serde(default)]
    forks_count: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    html_url: Option<String>,
}

impl From<ApiRepo> for RepoMetadata {
    fn from(repo: ApiRepo) -> Self {
        Self {
            name: repo.name,
            description: repo.description,
            language: repo.language,
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            updated_at: repo.updated_at,
            html_url: repo.html_url,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    #[serde(default)]
    public_repos: u32,
}

// ---------------------------------------------------------------------------
// GitHubClient
// ---------------------------------------------------------------------------

/// Resolves company organizations and lists their repositories.
pub struct GitHubClient {
    client: Client,
    opts: GitHubOptions,
    /// Used to read company websites when looking for organization links.
    pages: Arc<HttpFetcher>,
}

impl GitHubClient {
    pub fn new(opts: GitHubOptions, pages: Arc<HttpFetcher>) -> Result<Self> {
        Ok(Self {
            client: build_client(&opts.fetch)?,
            opts,
            pages,
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.opts.api_base);
        let mut request = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.opts.token {
            request = request.bearer_auth(token);
        }
        request
            .send()
            .await
            .map_err(|e| StartupIntelError::Network(format!("{url}: {e}")))
    }

    /// Whether `/orgs/<name>` exists.
    pub async fn org_exists(&self, name: &str) -> Result<bool> {
        let response = self.get(&format!("/orgs/{name}"), &[]).await?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StartupIntelError::Network(format!(
                "GitHub /orgs/{name}: HTTP {status}"
            ))),
        }
    }

    /// An organization, or a user account with enough public repositories to act like one.
    pub async fn is_organization_like(&self, name: &str) -> Result<bool> {
        if self.org_exists(name).await? {
            return Ok(true);
        }

        let response = self.get(&format!("/users/{name}"), &[]).await?;
        if !response.status().is_success() {
            return Ok(false);
        }
        let user: ApiUser = response
            .json()
            .await
            .map_err(|e| StartupIntelError::parse(format!("GitHub user {name}: {e}")))?;
        Ok(user.public_repos > MIN_USER_REPOS)
    }

    /// Page through `/orgs/<org>/repos`, most recently updated first.
    ///
    /// A failure on the first page is an error; a failure on a later page
    /// keeps what was fetched so far.
    #[instrument(skip_all, fields(org = %org))]
    pub async fn list_org_repos(&self, org: &str) -> Result<Vec<RepoMetadata>> {
        let mut repos: Vec<RepoMetadata> = Vec::new();
        let mut page = 1usize;

        while repos.len() < self.opts.max_repos {
            let query = [
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("sort", "updated".to_string()),
                ("direction", "desc".to_string()),
            ];

            let batch = match self.fetch_repo_page(org, &query).await {
                Ok(batch) => batch,
                Err(e) if page == 1 => return Err(e),
                Err(e) => {
                    warn!(page, error = %e, "repository page failed, keeping partial list");
                    break;
                }
            };

            let last_page = batch.len() < PER_PAGE;
            repos.extend(batch.into_iter().map(RepoMetadata::from));
            if last_page {
                break;
            }

            page += 1;
            if !self.opts.page_delay.is_zero() {
                tokio::time::sleep(self.opts.page_delay).await;
            }
        }

        repos.truncate(self.opts.max_repos);
        info!(count = repos.len(), pages = page, "repositories fetched");
        Ok(repos)
    }

    async fn fetch_repo_page(&self, org: &str, query: &[(&str, String)]) -> Result<Vec<ApiRepo>> {
        let response = self.get(&format!("/orgs/{org}/repos"), query).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StartupIntelError::Network(format!(
                "GitHub /orgs/{org}/repos: HTTP {status}"
            )));
        }
        response
            .json()
            .await
            .map_err(|e| StartupIntelError::parse(format!("GitHub repos for {org}: {e}")))
    }

    /// First organization-like account linked from the company website.
    async fn org_from_website(&self, website: &str) -> Option<String> {
        let html = match self.pages.fetch_html(&website_url(website)).await {
            Ok(Some(html)) => html,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, "website unavailable for organization lookup");
                return None;
            }
        };

        for login in github_links(&html) {
            match self.is_organization_like(&login).await {
                Ok(true) => return Some(login),
                Ok(false) => {}
                Err(e) => debug!(%login, error = %e, "organization check failed"),
            }
        }
        None
    }
}

#[async_trait]
impl OrgResolver for GitHubClient {
    #[instrument(skip_all, fields(company = %record.name))]
    async fn resolve(&self, record: &CompanyRecord) -> Result<Option<OrgIdentity>> {
        if let Some(website) = record.website() {
            if let Some(login) = self.org_from_website(website).await {
                info!(%login, "organization linked from website");
                return Ok(Some(OrgIdentity::new(login)));
            }
        }

        for candidate in org_candidates(&record.name) {
            if self.org_exists(&candidate).await? {
                info!(login = %candidate, "organization found by name");
                return Ok(Some(OrgIdentity::new(candidate)));
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl RepoFetcher for GitHubClient {
    async fn fetch_repos(&self, org: &OrgIdentity) -> Result<Vec<RepoMetadata>> {
        self.list_org_repos(&org.login).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Account names linked from HTML, in order, without vendor orgs or obvious non-orgs.
pub fn github_links(html: &str) -> Vec<String> {
    let mut logins: Vec<String> = Vec::new();
    for caps in GITHUB_LINK.captures_iter(html) {
        let login = caps[1].to_string();
        let lower = login.to_lowercase();
        if login.len() <= 2
            || lower.starts_with("user-")
            || VENDOR_ORGS.contains(&lower.as_str())
            || logins.iter().any(|l| l.eq_ignore_ascii_case(&login))
        {
            continue;
        }
        logins.push(login);
    }
    logins
}

/// Organization names to try for a company, most likely first.
pub fn org_candidates(company_name: &str) -> Vec<String> {
    let lowered = company_name.trim().to_lowercase();
    let name = LEGAL_SUFFIX.replace(&lowered, "").into_owned();
    let words: Vec<&str> = name.split_whitespace().collect();

    let mut raw = vec![
        name.replace(' ', "-"),
        name.replace(' ', ""),
        name.replace(' ', "_"),
        name.replace(' ', "."),
        words.first().map(|w| w.to_string()).unwrap_or_default(),
    ];
    if words.len() > 1 {
        raw.push(words.iter().filter_map(|w| w.chars().next()).collect());
        raw.push(format!("{}{}", words[0], words[words.len() - 1]));
    }

    let mut candidates: Vec<String> = Vec::new();
    for candidate in raw {
        if candidate.len() >= 2 && ORG_NAME.is_match(&candidate) && !candidates.contains(&candidate)
        {
            candidates.push(candidate);
        }
    }
    candidates.truncate(MAX_NAME_CANDIDATES);
    candidates
}
