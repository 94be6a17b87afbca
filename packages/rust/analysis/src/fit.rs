//! Rule-based strategic fit against the configured target profile.

use startupintel_shared::{CompanyRecord, TargetCriteria};

const CRITERION_POINTS: u8 = 2;

/// Scores records against a [`TargetCriteria`].
#[derive(Debug, Clone, Default)]
pub struct FitScorer {
    criteria: TargetCriteria,
}

impl FitScorer {
    pub fn new(criteria: TargetCriteria) -> Self {
        Self { criteria }
    }

    /// Fit score in [0, 10] using the record's stored AI-washing score.
    ///
    /// An unscored record contributes nothing for the AI-washing criterion.
    pub fn score(&self, record: &CompanyRecord) -> u8 {
        self.score_with(record, record.analysis.ai_washing_score)
    }

    /// Fit score in [0, 10] with an explicit AI-washing score.
    pub fn score_with(&self, record: &CompanyRecord, ai_washing_score: Option<u8>) -> u8 {
        let mut score = 0;
        if self.location_matches(record) {
            score += CRITERION_POINTS;
        }
        if self.stage_matches(record) {
            score += CRITERION_POINTS;
        }
        if self.size_matches(record) {
            score += CRITERION_POINTS;
        }
        if self.industry_matches(record) {
            score += CRITERION_POINTS;
        }
        score += match ai_washing_score.unwrap_or(0) {
            7.. => 2,
            5..=6 => 1,
            _ => 0,
        };
        score.min(10)
    }

    fn location_matches(&self, record: &CompanyRecord) -> bool {
        let Some(location) = record.location.as_deref() else {
            return false;
        };
        let location = location.to_lowercase();
        self.criteria
            .target_locations
            .iter()
            .any(|target| location.contains(&target.to_lowercase()))
    }

    fn stage_matches(&self, record: &CompanyRecord) -> bool {
        record
            .funding_stage
            .as_deref()
            .is_some_and(|stage| self.criteria.funding_stages.iter().any(|s| s == stage))
    }

    fn size_matches(&self, record: &CompanyRecord) -> bool {
        record.employees_count.is_some_and(|n| {
            (self.criteria.min_employees..=self.criteria.max_employees).contains(&n)
        })
    }

    fn industry_matches(&self, record: &CompanyRecord) -> bool {
        let Some(description) = record.description.as_deref() else {
            return false;
        };
        let description = description.to_lowercase();
        self.criteria
            .target_industries
            .iter()
            .any(|industry| description.contains(&industry.to_lowercase()))
    }
}
