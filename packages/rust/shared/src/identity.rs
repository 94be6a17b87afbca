//! Company identity keys.
//!
//! The identity key is the normalized website domain when a website is present,
//! otherwise the trimmed, lower-cased company name. An empty key means the record
//! cannot be deduplicated safely.

use url::Url;

/// Parse a website, assuming `https` for bare domains such as `acme.com`.
pub fn parse_website(website: &str) -> Option<Url> {
    let trimmed = website.trim();
    if trimmed.is_empty() {
        return None;
    }
    let url = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("https://{trimmed}"))
    };
    url.ok().filter(|u| u.host_str().is_some_and(|h| !h.is_empty()))
}

/// Normalize a website URL into a bare domain.
///
/// Only the host survives: scheme, credentials, port, path, query and a
/// leading `www.` are dropped, as is a trailing root dot.
pub fn normalize_domain(website: &str) -> String {
    let Some(url) = parse_website(website) else {
        return String::new();
    };
    let host = url
        .host_str()
        .unwrap_or_default()
        .trim_end_matches('.')
        .to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Normalize a company name for identity comparison.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Absolute URL for a website without query, fragment, or trailing slash.
///
/// Bare domains such as `acme.com` are assumed to be served over `https`.
/// Unparseable input is returned trimmed, with the same scheme default.
pub fn website_url(website: &str) -> String {
    match parse_website(website) {
        Some(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.as_str().trim_end_matches('/').to_string()
        }
        None => {
            let base = website.trim().trim_end_matches('/');
            if base.contains("://") {
                base.to_string()
            } else {
                format!("https://{base}")
            }
        }
    }
}

/// Derive the identity key for a company.
pub fn identity_key(website: Option<&str>, name: &str) -> String {
    let domain = website.map(normalize_domain).unwrap_or_default();
    if domain.is_empty() {
        normalize_name(name)
    } else {
        domain
    }
}
