//! Identity-based deduplication.
//!
//! The first-seen record for each identity key wins and is kept as-is. Fields
//! are not merged across sources here; that happens on storage upsert.

use std::collections::HashSet;

use startupintel_shared::CompanyRecord;
use tracing::debug;

/// Reduce `records` to one per identity key, preserving first-occurrence order.
///
/// Records with an empty identity key are dropped.
pub fn dedup_companies(records: Vec<CompanyRecord>) -> Vec<CompanyRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    let total = records.len();

    let unique: Vec<CompanyRecord> = records
        .into_iter()
        .filter(|record| {
            let key = record.identity_key();
            if key.is_empty() {
                debug!(name = %record.name, source = %record.source, "dropping record without identity");
                return false;
            }
            seen.insert(key)
        })
        .collect();

    debug!(total, unique = unique.len(), "deduplicated companies");
    unique
}
