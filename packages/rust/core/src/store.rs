//! Persistence seam used by the pipeline.

use async_trait::async_trait;
use startupintel_shared::{CompanyFilter, CompanyRecord, Result, RunStatistics, StoredCompany};
use startupintel_storage::Storage;

/// Where a run's companies and statistics end up.
#[async_trait]
pub trait CompanyStore: Send + Sync {
    /// Insert or merge a company. Returns its persistent id.
    async fn upsert_company(&self, record: &CompanyRecord) -> Result<i64>;

    async fn top_companies(&self, limit: u32, filter: &CompanyFilter)
    -> Result<Vec<StoredCompany>>;

    /// Returns the run id.
    async fn record_run(
        &self,
        stats: &RunStatistics,
        success: bool,
        error: Option<&str>,
    ) -> Result<String>;
}

#[async_trait]
impl CompanyStore for Storage {
    async fn upsert_company(&self, record: &CompanyRecord) -> Result<i64> {
        Storage::upsert_company(self, record).await
    }

    async fn top_companies(
        &self,
        limit: u32,
        filter: &CompanyFilter,
    ) -> Result<Vec<StoredCompany>> {
        Storage::top_companies(self, limit, filter).await
    }

    async fn record_run(
        &self,
        stats: &RunStatistics,
        success: bool,
        error: Option<&str>,
    ) -> Result<String> {
        Storage::record_run(self, stats, success, error).await
    }
}
