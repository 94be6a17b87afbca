//! Shared types, error model, and configuration for startupintel.
//!
//! This crate is the foundation depended on by all other startupintel crates.
//! It provides:
//! - [`StartupIntelError`] — the unified error type
//! - Domain types ([`CompanyRecord`], [`GithubAnalysis`], [`RunStatistics`], [`DiscoveryReport`])
//! - Identity-key derivation used by deduplication and storage
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod identity;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GitHubConfig, PipelineConfig, ScrapingConfig, SourceEntry,
    TargetCriteria, config_dir, config_file_path, expand_home, github_token, init_config,
    load_config, load_config_from, validate_credentials,
};
pub use error::{Result, StartupIntelError};
pub use identity::{identity_key, normalize_domain, normalize_name, parse_website, website_url};
pub use types::{
    CompanyAnalysis, CompanyFilter, CompanyRecord, CompanyScores, DiscoveryReport, FundingInfo,
    GithubAnalysis, JobPosting, RepoMetadata, RepoSummary, RunHistorySummary, RunStatistics,
    StoredCompany,
};
