//! Company scoring for startupintel.
//!
//! This crate provides:
//! - [`lexicon`] — versioned term tables and weights
//! - Collaborator traits ([`ContentFetcher`], [`OrgResolver`], [`RepoFetcher`], [`JobPostingSource`])
//! - The four AI-washing sub-analyses and the [`composite`] score
//! - [`FitScorer`] and the healthcare relevance classifier
//! - [`CompanyAnalyzer`], which runs all of the above for one company behind the
//!   [`CompanyScorer`] seam

pub mod analyzer;
pub mod blog;
pub mod collaborators;
pub mod composite;
pub mod fit;
pub mod footprint;
pub mod jobs;
pub mod lexicon;
pub mod marketing;
pub mod relevance;

#[cfg(test)]
pub(crate) mod test_support;

pub use analyzer::{CompanyAnalyzer, CompanyScorer};
pub use collaborators::{
    ContentFetcher, JobPostingSource, NoContent, OrgIdentity, OrgResolver, RecordPostings,
    RepoFetcher,
};
pub use composite::{AiWashingBreakdown, composite_score};
pub use fit::FitScorer;
pub use footprint::{analyze_repositories, footprint_score};
pub use relevance::is_healthcare_relevant;
