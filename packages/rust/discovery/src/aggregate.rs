//! Run every collector and fold their outcomes into one record list.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use startupintel_shared::{CompanyRecord, StartupIntelError};
use tracing::{info, instrument, warn};

use crate::collector::Collector;

/// Tagged result of running one collector.
#[derive(Debug)]
pub enum SourceOutcome {
    Collected {
        source: String,
        records: Vec<CompanyRecord>,
    },
    Failed {
        source: String,
        error: StartupIntelError,
    },
}

impl SourceOutcome {
    pub fn source(&self) -> &str {
        match self {
            Self::Collected { source, .. } | Self::Failed { source, .. } => source,
        }
    }
}

/// A collector that produced nothing because it failed as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub message: String,
}

/// Concatenated output of all successful collectors.
#[derive(Debug, Default)]
pub struct AggregateResult {
    /// Records from successful collectors, each collector's emission order preserved.
    pub records: Vec<CompanyRecord>,
    /// Total records collected, before deduplication.
    pub discovered: usize,
    pub failures: Vec<SourceFailure>,
}

/// Invoke each collector independently, at most `concurrency` at a time.
///
/// Outcomes come back in collector order. A collector error is captured as
/// [`SourceOutcome::Failed`] and never propagates.
#[instrument(skip_all, fields(collectors = collectors.len(), concurrency = concurrency))]
pub async fn run_collectors(
    collectors: &[Arc<dyn Collector>],
    concurrency: usize,
) -> Vec<SourceOutcome> {
    stream::iter(collectors.iter().cloned().map(|collector| async move {
        let source = collector.name().to_string();
        match collector.collect().await {
            Ok(records) => {
                info!(source = %source, count = records.len(), "source collected");
                SourceOutcome::Collected { source, records }
            }
            Err(e) => {
                warn!(source = %source, error = %e, "source unavailable, continuing");
                let error = match e {
                    StartupIntelError::SourceUnavailable { .. } => e,
                    other => StartupIntelError::source_unavailable(&source, other.to_string()),
                };
                SourceOutcome::Failed { source, error }
            }
        }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}

/// Fold tagged outcomes into the aggregate record list and failure tally.
pub fn aggregate(outcomes: Vec<SourceOutcome>) -> AggregateResult {
    let mut result = AggregateResult::default();

    for outcome in outcomes {
        match outcome {
            SourceOutcome::Collected { records, .. } => {
                result.discovered += records.len();
                result.records.extend(records);
            }
            SourceOutcome::Failed { source, error } => {
                result.failures.push(SourceFailure {
                    source,
                    message: error.to_string(),
                });
            }
        }
    }

    result
}
