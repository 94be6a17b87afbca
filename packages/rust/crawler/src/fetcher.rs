//! Rate-limited page fetching and HTML → text extraction.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Node};
use tracing::{debug, instrument, warn};
use url::Url;

use startupintel_analysis::ContentFetcher;
use startupintel_shared::{Result, ScrapingConfig, StartupIntelError};

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum response size we are willing to read (5 MB).
const MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

/// Elements whose text never counts as page content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements rendered as fenced code in extracted text.
const CODE_ELEMENTS: &[&str] = &["pre", "code"];

/// Link targets kept in extracted text even though they are attributes.
const REPO_HOSTS: &[&str] = &["github.com", "gitlab.com"];

// ---------------------------------------------------------------------------
// FetchOptions
// ---------------------------------------------------------------------------

/// Outbound request policy.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    pub timeout: Duration,
    /// Suspension before every request, to respect third-party rate limits.
    pub request_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&ScrapingConfig::default())
    }
}

impl From<&ScrapingConfig> for FetchOptions {
    fn from(config: &ScrapingConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

/// Build a reqwest client with the given policy.
pub(crate) fn build_client(opts: &FetchOptions) -> Result<Client> {
    Client::builder()
        .user_agent(opts.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(opts.timeout)
        .build()
        .map_err(|e| StartupIntelError::Network(format!("failed to build HTTP client: {e}")))
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

/// Fetches company web pages.
pub struct HttpFetcher {
    client: Client,
    opts: FetchOptions,
    /// Allow localhost/private IPs (for tests with mock servers).
    allow_localhost: bool,
}

impl HttpFetcher {
    pub fn new(opts: FetchOptions) -> Result<Self> {
        Ok(Self {
            client: build_client(&opts)?,
            opts,
            allow_localhost: false,
        })
    }

    /// Allow fetching localhost/private IPs (for tests).
    #[cfg(test)]
    pub fn allow_localhost(mut self) -> Self {
        self.allow_localhost = true;
        self
    }

    /// Fetch a page's raw HTML.
    ///
    /// Returns `Ok(None)` for 404/410. Other non-success statuses, network
    /// failures, and blocked targets are errors.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        let parsed = Url::parse(url)
            .map_err(|e| StartupIntelError::validation(format!("invalid URL {url}: {e}")))?;

        if !self.allow_localhost && is_ssrf_target(&parsed) {
            warn!("SSRF protection: blocked");
            return Err(StartupIntelError::validation(format!(
                "{url}: refusing to fetch private or non-HTTP target"
            )));
        }

        if !self.opts.request_delay.is_zero() {
            tokio::time::sleep(self.opts.request_delay).await;
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| StartupIntelError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE) {
            debug!(%status, "page not found");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StartupIntelError::Network(format!("{url}: HTTP {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > MAX_RESPONSE_SIZE {
                return Err(StartupIntelError::validation(format!(
                    "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| StartupIntelError::Network(format!("{url}: body read failed: {e}")))?;

        Ok(Some(body))
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<Option<String>> {
        let Some(html) = HttpFetcher::fetch_html(self, url).await? else {
            return Ok(None);
        };
        let text = extract_text(&html);
        Ok((!text.is_empty()).then_some(text))
    }

    async fn fetch_html(&self, url: &str) -> Result<Option<String>> {
        HttpFetcher::fetch_html(self, url).await
    }
}

/// Visible text of an HTML document, whitespace-collapsed.
///
/// `pre`/`code` blocks come out wrapped in ``` fences, and links to
/// repository hosts are appended after the text, so code-sample signals
/// survive extraction.
pub fn extract_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();
    let mut repo_links: Vec<&str> = Vec::new();

    for node in doc.root_element().descendants() {
        let inside = |names: &[&str]| {
            node.ancestors().any(|ancestor| {
                matches!(ancestor.value(), Node::Element(el) if names.contains(&el.name()))
            })
        };
        match node.value() {
            Node::Text(text) => {
                if inside(SKIPPED_ELEMENTS) || inside(CODE_ELEMENTS) {
                    continue;
                }
                parts.extend(text.split_whitespace());
            }
            Node::Element(el) if CODE_ELEMENTS.contains(&el.name()) => {
                if inside(SKIPPED_ELEMENTS) || inside(CODE_ELEMENTS) {
                    continue;
                }
                if let Some(block) = ElementRef::wrap(node) {
                    parts.push("```");
                    parts.extend(block.text().flat_map(str::split_whitespace));
                    parts.push("```");
                }
            }
            Node::Element(el) if el.name() == "a" => {
                let Some(href) = el.attr("href") else {
                    continue;
                };
                let repo_link = REPO_HOSTS.iter().any(|host| href.contains(host));
                if repo_link && !repo_links.contains(&href) {
                    repo_links.push(href);
                }
            }
            _ => {}
        }
    }

    parts.extend(repo_links);
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// SSRF protection
// ---------------------------------------------------------------------------

/// Check if a URL targets a potentially dangerous resource.
pub(crate) fn is_ssrf_target(url: &Url) -> bool {
    match url.scheme() {
        "http" | "https" => {}
        _ => return true,
    }

    if let Some(host) = url.host_str() {
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return is_private_ip(&ip);
        }
        if host == "localhost" || host.ends_with(".local") || host.ends_with(".internal") {
            return true;
        }
    }

    false
}

/// Check if an IP is in a private/reserved range.
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                // 100.64.0.0/10 (Carrier-grade NAT)
                || (v4.octets()[0] == 100 && (v4.octets()[1] & 0xC0) == 64)
        }
        IpAddr::V6(v6) => v6.is_loopback() || v6.is_unspecified(),
    }
}
