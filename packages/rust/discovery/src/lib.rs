//! Multi-source company discovery.
//!
//! Each data source is a [`Collector`]. The [`aggregate`] module runs all
//! collectors with bounded concurrency and isolates their failures, and
//! [`dedup`] reduces the combined output to one record per company identity.

pub mod aggregate;
pub mod collector;
pub mod dedup;

pub use aggregate::{AggregateResult, SourceFailure, SourceOutcome, aggregate, run_collectors};
pub use collector::{Collector, SeedFileCollector, StaticCollector};
pub use dedup::dedup_companies;
