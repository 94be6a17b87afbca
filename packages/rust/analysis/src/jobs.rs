//! Job-mix sub-analysis: how much of the hiring is ML work.

use startupintel_shared::{CompanyRecord, JobPosting};
use tracing::warn;

use crate::collaborators::JobPostingSource;
use crate::lexicon::job_title_weight;

/// Sub-score when no job data is available.
pub const NO_JOBS_SCORE: f64 = 3.0;

/// Weighted ML-role ratio: sum of title weights over the number of postings.
///
/// The numerator is weighted, so a single heavily weighted posting in a short
/// list can push the ratio well past its share of headcount.
pub fn weighted_ml_ratio(postings: &[JobPosting]) -> Option<f64> {
    if postings.is_empty() {
        return None;
    }
    let weighted: f64 = postings.iter().map(|p| job_title_weight(&p.title)).sum();
    Some(weighted / postings.len() as f64)
}

/// Map an ML-role ratio onto the discrete sub-score scale.
pub fn ratio_to_score(ratio: f64) -> f64 {
    match ratio {
        r if r >= 0.30 => 10.0,
        r if r >= 0.20 => 8.0,
        r if r >= 0.15 => 6.0,
        r if r >= 0.10 => 4.0,
        _ => 2.0,
    }
}

/// Score a set of postings, defaulting to [`NO_JOBS_SCORE`] when empty.
pub fn score_postings(postings: &[JobPosting]) -> f64 {
    weighted_ml_ratio(postings).map_or(NO_JOBS_SCORE, ratio_to_score)
}

/// Fetch postings and score them. Source errors degrade to [`NO_JOBS_SCORE`].
pub async fn job_mix(source: &dyn JobPostingSource, record: &CompanyRecord) -> f64 {
    match source.postings(record).await {
        Ok(postings) => score_postings(&postings),
        Err(e) => {
            warn!(company = %record.name, error = %e, "job postings unavailable");
            NO_JOBS_SCORE
        }
    }
}
