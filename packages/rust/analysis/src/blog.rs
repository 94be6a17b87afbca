//! Engineering-blog depth sub-analysis.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use startupintel_shared::{CompanyRecord, parse_website, website_url};
use tracing::{debug, warn};
use url::Url;

use crate::collaborators::ContentFetcher;
use crate::lexicon::{
    BLOG_LINK_KEYWORDS, BLOG_NEGATIVE_TERMS, BLOG_PATHS, BLOG_POSITIVE_TERMS, CODE_MARKERS,
    TECHNICAL_DEPTH_REGEXES, contains_any, count_terms,
};

/// Sub-score when no blog content could be found.
pub const NO_BLOG_SCORE: f64 = 2.0;

/// Most homepage links considered as blog candidates.
pub const MAX_DISCOVERED_BLOG_LINKS: usize = 5;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

/// Score one page of blog text for technical depth, in [0, 10].
pub fn score_blog_text(text: &str) -> f64 {
    if text.trim().is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();

    let positives = count_terms(&lower, BLOG_POSITIVE_TERMS) as f64;
    let negatives = count_terms(&lower, BLOG_NEGATIVE_TERMS) as f64;
    let patterns = TECHNICAL_DEPTH_REGEXES
        .iter()
        .filter(|re| re.is_match(&lower))
        .count() as f64;

    let mut score = (positives * 0.5).min(6.0);
    score -= negatives;
    score += (patterns * 0.5).min(3.0);
    if contains_any(&lower, CODE_MARKERS) {
        score += 1.0;
    }

    score.clamp(0.0, 10.0)
}

/// Fixed blog paths under a website, in probe order.
pub fn blog_candidates(website: &str) -> Vec<String> {
    let base = website_url(website);
    BLOG_PATHS.iter().map(|path| format!("{base}{path}")).collect()
}

/// Blog-looking links on a homepage: href or link text mentions a blog
/// keyword. Resolved against `base`, de-duplicated, at most
/// [`MAX_DISCOVERED_BLOG_LINKS`].
pub fn discover_blog_links(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut found: Vec<String> = Vec::new();

    for anchor in doc.select(&ANCHORS) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href_lower = href.to_lowercase();
        let text = anchor.text().collect::<String>().to_lowercase();
        if !BLOG_LINK_KEYWORDS
            .iter()
            .any(|k| href_lower.contains(k) || text.contains(k))
        {
            continue;
        }

        let Ok(mut url) = base.join(href.trim()) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") {
            continue;
        }
        url.set_fragment(None);
        let url = url.to_string();
        if !found.contains(&url) {
            found.push(url);
        }
        if found.len() >= MAX_DISCOVERED_BLOG_LINKS {
            break;
        }
    }

    found
}

/// Homepage links first, then the fixed paths not already listed.
async fn candidate_urls(
    fetcher: &dyn ContentFetcher,
    record: &CompanyRecord,
    website: &str,
) -> Vec<String> {
    let mut urls = match parse_website(website) {
        Some(base) => match fetcher.fetch_html(base.as_str()).await {
            Ok(Some(html)) => discover_blog_links(&html, &base),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(company = %record.name, error = %e, "homepage fetch failed");
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    if !urls.is_empty() {
        debug!(company = %record.name, links = urls.len(), "blog links found on homepage");
    }
    for url in blog_candidates(website) {
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

/// Average depth score over up to `max_posts` blog pages that returned text.
///
/// Never fails: fetch errors skip that candidate, and a record without a
/// website or without any blog content gets [`NO_BLOG_SCORE`].
pub async fn blog_depth(
    fetcher: &dyn ContentFetcher,
    record: &CompanyRecord,
    max_posts: usize,
) -> f64 {
    let Some(website) = record.website() else {
        return NO_BLOG_SCORE;
    };

    let mut scores = Vec::new();
    for url in candidate_urls(fetcher, record, website).await {
        if scores.len() >= max_posts {
            break;
        }
        match fetcher.fetch_text(&url).await {
            Ok(Some(text)) if !text.trim().is_empty() => {
                let score = score_blog_text(&text);
                debug!(company = %record.name, %url, score, "scored blog page");
                scores.push(score);
            }
            Ok(_) => {}
            Err(e) => warn!(company = %record.name, %url, error = %e, "blog fetch failed"),
        }
    }

    if scores.is_empty() {
        return NO_BLOG_SCORE;
    }
    let avg = scores.iter().sum::<f64>() / scores.len() as f64;
    avg.min(10.0)
}
