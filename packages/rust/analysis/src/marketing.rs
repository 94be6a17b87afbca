//! Marketing-specificity sub-analysis.
//!
//! Specific, falsifiable claims raise the score; vague buzzwords lower it.
//! Mentioning a hosted generative-AI product without a single specific claim
//! marks a likely thin wrapper and costs an extra penalty.

use startupintel_shared::{CompanyRecord, website_url};
use tracing::warn;

use crate::collaborators::ContentFetcher;
use crate::lexicon::{
    GENAI_INTEGRATION_MARKERS, SPECIFIC_CLAIMS, VAGUE_CLAIMS, contains_any, count_terms,
};

/// Base score, and the sub-score when there is nothing to read.
pub const MARKETING_BASE_SCORE: f64 = 5.0;

/// Penalty for generative-AI integration with no specific claims.
pub const WRAPPER_PENALTY: f64 = 3.0;

/// Score marketing text in [0, 10].
pub fn score_marketing_text(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let specific = count_terms(&lower, SPECIFIC_CLAIMS);
    let vague = count_terms(&lower, VAGUE_CLAIMS);

    let mut score = MARKETING_BASE_SCORE;
    score += (specific as f64 * 0.5).min(3.0);
    score -= (vague as f64 * 0.3).min(3.0);
    if specific == 0 && contains_any(&lower, GENAI_INTEGRATION_MARKERS) {
        score -= WRAPPER_PENALTY;
    }

    score.clamp(0.0, 10.0)
}

/// Score the record description together with the website's landing page.
///
/// A fetch error degrades to [`MARKETING_BASE_SCORE`].
pub async fn marketing_specificity(fetcher: &dyn ContentFetcher, record: &CompanyRecord) -> f64 {
    let description = record.description.as_deref().unwrap_or_default();
    let website = record.website();

    if website.is_none() && description.trim().is_empty() {
        return MARKETING_BASE_SCORE;
    }

    let page = match website {
        Some(site) => match fetcher.fetch_text(&website_url(site)).await {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                warn!(company = %record.name, error = %e, "marketing content unavailable");
                return MARKETING_BASE_SCORE;
            }
        },
        None => String::new(),
    };

    score_marketing_text(&format!("{description} {page}"))
}
