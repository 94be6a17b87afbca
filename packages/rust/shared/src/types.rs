//! Core domain types for company discovery and scoring.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::identity_key;

// ---------------------------------------------------------------------------
// CompanyRecord
// ---------------------------------------------------------------------------

/// A candidate company flowing through one discovery run.
///
/// The collector-supplied fields are set once at creation. Everything under
/// [`CompanyRecord::analysis`] is written only by the scoring stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    /// Company name (required).
    pub name: String,
    /// Company website, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Tag of the collector that produced this record.
    #[serde(default)]
    pub source: String,
    /// Article or listing URL that surfaced the company.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_article: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Funding stage, e.g. "Series A".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    /// Details of the most recent round, when the source reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_info: Option<FundingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<u16>,
    /// Accelerator batch, e.g. "W22".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<String>,
    /// Free-form tags supplied by the collector.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub keywords: BTreeSet<String>,
    /// Open job postings seen by the collector.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub job_postings: Vec<JobPosting>,

    /// Scorer-supplied fields.
    #[serde(default)]
    pub analysis: CompanyAnalysis,
}

impl CompanyRecord {
    /// Create a record with just a name and source tag.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            ..Default::default()
        }
    }

    /// Builder-style website setter.
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Builder-style description setter.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The deduplication key for this record. Empty when neither website nor name is usable.
    pub fn identity_key(&self) -> String {
        identity_key(self.website.as_deref(), &self.name)
    }

    /// Website, treating an empty string as absent.
    pub fn website(&self) -> Option<&str> {
        self.website.as_deref().map(str::trim).filter(|w| !w.is_empty())
    }

    /// Write the results of a successful analysis onto the record.
    pub fn apply_scores(&mut self, scores: CompanyScores) {
        self.analysis.ai_washing_score = Some(scores.ai_washing_score);
        self.analysis.strategic_fit_score = Some(scores.strategic_fit_score);
        self.analysis.healthcare_relevance = scores.healthcare_relevance;
        self.analysis.github_analysis = Some(scores.github_analysis);
        self.analysis.analysis_error = None;
    }

    /// Keep the record after a failed analysis, flagged with the error and a zero score.
    ///
    /// Any fit score from an earlier analysis is cleared. Healthcare relevance
    /// is supplied by the caller since the classifier cannot fail.
    pub fn mark_analysis_failed(&mut self, error: impl Into<String>, healthcare_relevance: bool) {
        self.analysis.ai_washing_score = Some(0);
        self.analysis.strategic_fit_score = None;
        self.analysis.healthcare_relevance = healthcare_relevance;
        self.analysis.analysis_error = Some(error.into());
    }
}

/// A funding round as reported by a collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundingInfo {
    /// Round type, e.g. "Seed" or "Series B".
    pub round_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_usd: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_investor: Option<String>,
    /// Announcement date as given by the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announced_date: Option<String>,
}

/// Derived fields populated only by the scoring stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysis {
    /// 1–10 once scored; 0 when analysis failed; absent until scored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_washing_score: Option<u8>,
    /// 0–10 rule-based fit score.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategic_fit_score: Option<u8>,
    #[serde(default)]
    pub healthcare_relevance: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_analysis: Option<GithubAnalysis>,
    /// Set when scoring failed part-way but the record was kept.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

/// Output of one successful company analysis, applied via [`CompanyRecord::apply_scores`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyScores {
    pub ai_washing_score: u8,
    pub strategic_fit_score: u8,
    pub healthcare_relevance: bool,
    pub github_analysis: GithubAnalysis,
}

// ---------------------------------------------------------------------------
// Job postings & repositories
// ---------------------------------------------------------------------------

/// An open job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JobPosting {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }
}

/// Public repository metadata as returned by a repository host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub forks: u32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// An ML-related repository as recorded in a [`GithubAnalysis`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub stars: u32,
    pub forks: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Per-repository ML relevance, 0–10.
    pub ml_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Technical-footprint sub-report for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GithubAnalysis {
    pub organization_found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    pub total_repositories: usize,
    /// Repositories whose primary language is the ML-adjacent one (Python).
    pub python_repositories: usize,
    /// Repositories flagged by the ML keyword list.
    pub ml_related_repos: usize,
    pub recent_ml_activity: bool,
    #[serde(default)]
    pub ml_repositories: Vec<RepoSummary>,
    /// High-visibility ML repositories, most-starred first.
    #[serde(default)]
    pub open_source_ml_projects: Vec<RepoSummary>,
    #[serde(default)]
    pub languages_used: BTreeMap<String, usize>,
    /// 0–10 footprint score.
    pub ml_contributions_score: u8,
    pub analysis_date: DateTime<Utc>,
    /// Set when the organization was found but its repositories could not be listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetch_error: Option<String>,
}

impl GithubAnalysis {
    /// The result when no organization could be resolved.
    pub fn not_found(now: DateTime<Utc>) -> Self {
        Self {
            organization_found: false,
            organization_name: None,
            total_repositories: 0,
            python_repositories: 0,
            ml_related_repos: 0,
            recent_ml_activity: false,
            ml_repositories: Vec::new(),
            open_source_ml_projects: Vec::new(),
            languages_used: BTreeMap::new(),
            ml_contributions_score: 0,
            analysis_date: now,
            fetch_error: None,
        }
    }

    /// The result when an organization was found but listing its repositories failed.
    pub fn unavailable(
        organization: impl Into<String>,
        error: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            organization_found: true,
            organization_name: Some(organization.into()),
            fetch_error: Some(error.into()),
            ..Self::not_found(now)
        }
    }

    /// Whether the repository listing behind this analysis is usable for scoring.
    pub fn is_scorable(&self) -> bool {
        self.organization_found && self.fetch_error.is_none()
    }
}

// ---------------------------------------------------------------------------
// Run statistics & report
// ---------------------------------------------------------------------------

/// Counters accumulated over one pipeline execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStatistics {
    /// Records returned by all collectors, before deduplication.
    pub companies_discovered: usize,
    /// Records remaining after deduplication.
    pub unique_companies: usize,
    /// Records whose analysis completed.
    pub companies_analyzed: usize,
    pub high_potential_targets: usize,
    pub ai_washing_filtered: usize,
    /// Records kept with `analysis_error` set.
    pub analysis_failures: usize,
    /// Collectors that failed as a whole.
    pub source_failures: usize,
    pub run_start_time: Option<DateTime<Utc>>,
    pub run_end_time: Option<DateTime<Utc>>,
}

impl RunStatistics {
    /// Seconds between start and end, or 0 when the run has not finished.
    pub fn runtime_seconds(&self) -> f64 {
        match (self.run_start_time, self.run_end_time) {
            (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 1000.0,
            _ => 0.0,
        }
    }
}

/// A company as read back from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCompany {
    /// Storage row id.
    pub id: i64,
    #[serde(flatten)]
    pub company: CompanyRecord,
    pub updated_at: DateTime<Utc>,
}

/// Filters applied to top-company queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilter {
    pub healthcare_only: bool,
    pub min_ai_washing_score: Option<u8>,
    pub min_strategic_fit_score: Option<u8>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
}

/// Final output of a discovery run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub date: DateTime<Utc>,
    pub runtime_seconds: f64,
    pub statistics: RunStatistics,
    pub top_targets: Vec<StoredCompany>,
    pub recommendations: Vec<String>,
}

/// Aggregates over past discovery runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunHistorySummary {
    pub total_runs: u64,
    pub successful_runs: u64,
    pub avg_discovered: f64,
    pub avg_analyzed: f64,
    pub avg_targets: f64,
    pub avg_runtime_seconds: f64,
}
