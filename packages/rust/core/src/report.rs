//! Ranking and report assembly.

use std::cmp::{Ordering, Reverse};

use chrono::{DateTime, Utc};
use startupintel_shared::{DiscoveryReport, RunStatistics, StoredCompany};

/// Sort best-first: fit descending, then AI-washing descending, then most recently updated.
/// Unscored companies sort after scored ones.
pub fn rank_companies(companies: &mut [StoredCompany]) {
    companies.sort_by(|a, b| {
        let key = |c: &StoredCompany| {
            (
                c.company.analysis.strategic_fit_score.map(Reverse),
                c.company.analysis.ai_washing_score.map(Reverse),
            )
        };
        let (fit_a, ai_a) = key(a);
        let (fit_b, ai_b) = key(b);
        none_last(fit_a, fit_b)
            .then_with(|| none_last(ai_a, ai_b))
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

fn none_last<T: Ord>(a: Option<T>, b: Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Follow-up suggestions derived from run statistics and the top targets.
pub fn recommendations(stats: &RunStatistics, top_targets: &[StoredCompany]) -> Vec<String> {
    let mut out = Vec::new();

    if stats.high_potential_targets > 0 {
        out.push(format!(
            "Found {} high-potential targets. Focus deep analysis on these companies.",
            stats.high_potential_targets
        ));
    }

    if stats.ai_washing_filtered > stats.high_potential_targets {
        out.push(
            "High ratio of AI-washing companies detected. Current filters are working effectively."
                .to_string(),
        );
    }

    let healthcare = top_targets
        .iter()
        .filter(|t| t.company.analysis.healthcare_relevance)
        .count();
    if healthcare > 0 {
        out.push(format!(
            "Found {healthcare} healthcare-relevant targets. Leverage healthcare experience in outreach."
        ));
    }

    if stats.source_failures > 0 {
        out.push(format!(
            "{} source(s) failed during collection. Check source health before relying on coverage.",
            stats.source_failures
        ));
    }

    out
}

pub(crate) fn build_report(
    date: DateTime<Utc>,
    statistics: RunStatistics,
    top_targets: Vec<StoredCompany>,
) -> DiscoveryReport {
    let recommendations = recommendations(&statistics, &top_targets);
    DiscoveryReport {
        date,
        runtime_seconds: statistics.runtime_seconds(),
        statistics,
        top_targets,
        recommendations,
    }
}
