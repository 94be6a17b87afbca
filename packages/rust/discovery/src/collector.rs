//! The collector seam and the built-in collectors.

use std::path::PathBuf;

use async_trait::async_trait;
use startupintel_shared::{CompanyRecord, Result, StartupIntelError};
use tracing::{debug, instrument};

/// A single data source producing raw company records.
///
/// Collectors share no state. A collector that returns `Err` is treated as
/// "zero records, one failure" by the aggregator; retries are the collector's
/// own business.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Source tag, stamped onto records and used in logs.
    fn name(&self) -> &str;

    /// Fetch every record this source currently knows about, in emission order.
    async fn collect(&self) -> Result<Vec<CompanyRecord>>;
}

// ---------------------------------------------------------------------------
// SeedFileCollector
// ---------------------------------------------------------------------------

/// Reads a JSON array of company records from disk.
///
/// This is how curated lists (accelerator batches, news roundups) are fed
/// into a run. Every record is stamped with the collector's name as its source.
#[derive(Debug, Clone)]
pub struct SeedFileCollector {
    name: String,
    path: PathBuf,
}

impl SeedFileCollector {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl Collector for SeedFileCollector {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(source = %self.name, path = %self.path.display()))]
    async fn collect(&self) -> Result<Vec<CompanyRecord>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| StartupIntelError::io(&self.path, e))?;

        let mut records: Vec<CompanyRecord> = serde_json::from_str(&content).map_err(|e| {
            StartupIntelError::parse(format!("{}: {e}", self.path.display()))
        })?;

        for record in &mut records {
            record.source = self.name.clone();
        }

        debug!(count = records.len(), "seed file loaded");
        Ok(records)
    }
}

// ---------------------------------------------------------------------------
// StaticCollector
// ---------------------------------------------------------------------------

/// A collector over a fixed in-memory list. Used for ad hoc runs and tests.
#[derive(Debug, Clone)]
pub struct StaticCollector {
    name: String,
    records: Vec<CompanyRecord>,
}

impl StaticCollector {
    pub fn new(name: impl Into<String>, records: Vec<CompanyRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

#[async_trait]
impl Collector for StaticCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> Result<Vec<CompanyRecord>> {
        Ok(self.records.clone())
    }
}
