//! Discovery run orchestration for startupintel.
//!
//! This crate ties together collection, deduplication, per-company analysis,
//! persistence, and report assembly into one run ([`DiscoveryPipeline::run`]).

pub mod pipeline;
pub mod report;
pub mod store;

pub use pipeline::{DiscoveryPipeline, ProgressReporter, RunState, SilentProgress};
pub use report::{rank_companies, recommendations};
pub use store::CompanyStore;
