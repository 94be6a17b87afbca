//! HTTP collaborators for company analysis.
//!
//! This crate provides:
//! - [`HttpFetcher`] — rate-limited page fetching with SSRF protection and text extraction
//! - [`GitHubClient`] — organization resolution and repository listing over the GitHub REST API

pub mod fetcher;
pub mod github;

pub use fetcher::{FetchOptions, HttpFetcher, extract_text};
pub use github::{GitHubClient, GitHubOptions, github_links, org_candidates};
