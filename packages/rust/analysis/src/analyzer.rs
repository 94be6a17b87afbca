//! Per-company analysis: every sub-score, the composite, fit, and relevance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use startupintel_shared::{CompanyRecord, CompanyScores, Result, TargetCriteria};
use tracing::{debug, instrument};

use crate::blog::blog_depth;
use crate::collaborators::{
    ContentFetcher, JobPostingSource, OrgResolver, RecordPostings, RepoFetcher,
};
use crate::composite::{AiWashingBreakdown, footprint_subscore};
use crate::fit::FitScorer;
use crate::footprint::technical_footprint;
use crate::jobs::job_mix;
use crate::marketing::marketing_specificity;
use crate::relevance::is_healthcare_relevant;

/// Default number of blog pages scored per company.
pub const DEFAULT_MAX_BLOG_POSTS: usize = 3;

/// Scores one company. The discovery pipeline depends on this rather than on
/// [`CompanyAnalyzer`] directly.
#[async_trait]
pub trait CompanyScorer: Send + Sync {
    async fn score_company(
        &self,
        record: &CompanyRecord,
        now: DateTime<Utc>,
    ) -> Result<CompanyScores>;
}

/// Scores one company at a time using the configured collaborators.
#[derive(Clone)]
pub struct CompanyAnalyzer {
    content: Arc<dyn ContentFetcher>,
    orgs: Arc<dyn OrgResolver>,
    repos: Arc<dyn RepoFetcher>,
    jobs: Arc<dyn JobPostingSource>,
    fit: FitScorer,
    max_blog_posts: usize,
}

impl CompanyAnalyzer {
    pub fn new(
        content: Arc<dyn ContentFetcher>,
        orgs: Arc<dyn OrgResolver>,
        repos: Arc<dyn RepoFetcher>,
        criteria: TargetCriteria,
    ) -> Self {
        Self {
            content,
            orgs,
            repos,
            jobs: Arc::new(RecordPostings),
            fit: FitScorer::new(criteria),
            max_blog_posts: DEFAULT_MAX_BLOG_POSTS,
        }
    }

    /// Replace the default job-posting source (postings attached to the record).
    pub fn with_job_source(mut self, jobs: Arc<dyn JobPostingSource>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn with_max_blog_posts(mut self, max_blog_posts: usize) -> Self {
        self.max_blog_posts = max_blog_posts;
        self
    }

    /// Analyze a company as of now.
    pub async fn analyze(&self, record: &CompanyRecord) -> Result<CompanyScores> {
        self.analyze_at(record, Utc::now()).await
    }

    /// Analyze a company, treating `now` as the reference time for recency checks.
    ///
    /// Every sub-analysis degrades to its default on collaborator failure, so
    /// this currently always succeeds.
    #[instrument(skip_all, fields(company = %record.name))]
    pub async fn analyze_at(
        &self,
        record: &CompanyRecord,
        now: DateTime<Utc>,
    ) -> Result<CompanyScores> {
        let github =
            technical_footprint(self.orgs.as_ref(), self.repos.as_ref(), record, now).await;

        let breakdown = AiWashingBreakdown {
            blog: blog_depth(self.content.as_ref(), record, self.max_blog_posts).await,
            jobs: job_mix(self.jobs.as_ref(), record).await,
            footprint: footprint_subscore(Some(&github)),
            marketing: marketing_specificity(self.content.as_ref(), record).await,
        };
        let ai_washing_score = breakdown.score();

        // Fit depends on the AI-washing score, so it is computed second.
        let strategic_fit_score = self.fit.score_with(record, Some(ai_washing_score));
        let healthcare_relevance = is_healthcare_relevant(record);

        debug!(
            blog = breakdown.blog,
            jobs = breakdown.jobs,
            footprint = breakdown.footprint,
            marketing = breakdown.marketing,
            ai_washing_score,
            strategic_fit_score,
            "company scored"
        );

        Ok(CompanyScores {
            ai_washing_score,
            strategic_fit_score,
            healthcare_relevance,
            github_analysis: github,
        })
    }
}

#[async_trait]
impl CompanyScorer for CompanyAnalyzer {
    async fn score_company(
        &self,
        record: &CompanyRecord,
        now: DateTime<Utc>,
    ) -> Result<CompanyScores> {
        self.analyze_at(record, now).await
    }
}
