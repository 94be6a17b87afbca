//! Composite AI-washing score.
//!
//! Four sub-scores in [0, 10] are weighted and summed, then rounded and
//! clamped to [1, 10]. Blog depth and hiring mix carry the most weight since
//! they reflect sustained investment; marketing copy carries the least.

use startupintel_shared::GithubAnalysis;

pub const BLOG_WEIGHT: f64 = 0.30;
pub const JOBS_WEIGHT: f64 = 0.25;
pub const FOOTPRINT_WEIGHT: f64 = 0.25;
pub const MARKETING_WEIGHT: f64 = 0.20;

/// Footprint sub-score when no organization was found or its repositories
/// could not be listed.
pub const NO_FOOTPRINT_SCORE: f64 = 2.0;

/// The four sub-scores feeding one AI-washing score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiWashingBreakdown {
    pub blog: f64,
    pub jobs: f64,
    pub footprint: f64,
    pub marketing: f64,
}

impl Default for AiWashingBreakdown {
    /// The all-absent input: no blog, no jobs, no footprint, nothing to read.
    fn default() -> Self {
        Self {
            blog: crate::blog::NO_BLOG_SCORE,
            jobs: crate::jobs::NO_JOBS_SCORE,
            footprint: NO_FOOTPRINT_SCORE,
            marketing: crate::marketing::MARKETING_BASE_SCORE,
        }
    }
}

impl AiWashingBreakdown {
    /// Weighted sum before rounding.
    pub fn weighted_sum(&self) -> f64 {
        BLOG_WEIGHT * self.blog.clamp(0.0, 10.0)
            + JOBS_WEIGHT * self.jobs.clamp(0.0, 10.0)
            + FOOTPRINT_WEIGHT * self.footprint.clamp(0.0, 10.0)
            + MARKETING_WEIGHT * self.marketing.clamp(0.0, 10.0)
    }

    /// Final score in [1, 10].
    pub fn score(&self) -> u8 {
        composite_score(self.weighted_sum())
    }
}

/// Round half away from zero, then clamp to [1, 10].
pub fn composite_score(weighted_sum: f64) -> u8 {
    if weighted_sum.is_nan() {
        return 1;
    }
    weighted_sum.round().clamp(1.0, 10.0) as u8
}

/// Footprint sub-score for the composite: the footprint score when an
/// organization was found and listed, otherwise [`NO_FOOTPRINT_SCORE`].
pub fn footprint_subscore(analysis: Option<&GithubAnalysis>) -> f64 {
    match analysis {
        Some(a) if a.is_scorable() => f64::from(a.ml_contributions_score),
        _ => NO_FOOTPRINT_SCORE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn all_defaults_round_to_three() {
        let breakdown = AiWashingBreakdown::default();
        assert!((breakdown.weighted_sum() - 2.85).abs() < 1e-9);
        assert_eq!(breakdown.score(), 3);
    }

    #[test]
    fn all_tens_is_ten() {
        let breakdown = AiWashingBreakdown {
            blog: 10.0,
            jobs: 10.0,
            footprint: 10.0,
            marketing: 10.0,
        };
        assert_eq!(breakdown.score(), 10);
    }

    #[test]
    fn out_of_range_inputs_stay_in_bounds() {
        let high = AiWashingBreakdown {
            blog: 50.0,
            jobs: 50.0,
            footprint: 50.0,
            marketing: 50.0,
        };
        assert_eq!(high.score(), 10);

        let low = AiWashingBreakdown {
            blog: 0.0,
            jobs: 0.0,
            footprint: 0.0,
            marketing: 0.0,
        };
        assert_eq!(low.score(), 1);
        assert_eq!(composite_score(f64::NAN), 1);
    }

    #[test]
    fn every_grid_point_is_in_range() {
        let steps = [0.0, 2.5, 5.0, 7.5, 10.0];
        for blog in steps {
            for jobs in steps {
                for footprint in steps {
                    for marketing in steps {
                        let score = AiWashingBreakdown {
                            blog,
                            jobs,
                            footprint,
                            marketing,
                        }
                        .score();
                        assert!((1..=10).contains(&score));
                    }
                }
            }
        }
    }

    #[test]
    fn footprint_subscore_uses_default_when_not_found() {
        let now = Utc::now();
        assert_eq!(footprint_subscore(None), NO_FOOTPRINT_SCORE);
        assert_eq!(
            footprint_subscore(Some(&GithubAnalysis::not_found(now))),
            NO_FOOTPRINT_SCORE
        );
        let mut found = GithubAnalysis::not_found(now);
        found.organization_found = true;
        found.ml_contributions_score = 7;
        assert_eq!(footprint_subscore(Some(&found)), 7.0);

        let unlisted = GithubAnalysis::unavailable("acme", "HTTP 502", now);
        assert_eq!(footprint_subscore(Some(&unlisted)), NO_FOOTPRINT_SCORE);
    }
}
