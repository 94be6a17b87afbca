//! Turso Embedded / libSQL storage layer.
//!
//! The [`Storage`] struct wraps a libSQL database holding discovered companies,
//! their technical-footprint analyses, and discovery run history.
//!
//! **Merge rules:** [`Storage::upsert_company`] is keyed by the identity key.
//! Descriptive and score fields take the new value when present and keep the
//! stored value otherwise, so records from different sources fill each other in.
//! A record whose analysis failed writes its (empty) fit score as-is.

mod migrations;

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use libsql::{Connection, Database, params};
use startupintel_shared::{
    CompanyAnalysis, CompanyFilter, CompanyRecord, FundingInfo, GithubAnalysis, JobPosting,
    Result, RunHistorySummary, RunStatistics, StartupIntelError, StoredCompany,
};
use tracing::debug;
use uuid::Uuid;

/// Columns selected for a [`StoredCompany`], in [`row_to_company`] order.
const COMPANY_COLUMNS: &str = "c.id, c.name, c.website, c.source, c.source_article, c.description,
    c.location, c.funding_stage, c.employees_count, c.founded_year, c.batch, c.keywords_json,
    c.job_postings_json, c.ai_washing_score, c.strategic_fit_score, c.healthcare_relevance,
    c.analysis_error, c.updated_at, ci.github_analysis_json,
    (SELECT json_object('round_type', f.round_type, 'amount_usd', f.amount_usd,
                        'lead_investor', f.lead_investor, 'announced_date', f.announced_date)
     FROM funding_rounds f WHERE f.company_id = c.id
     ORDER BY f.updated_at DESC, f.id DESC LIMIT 1)";

/// Ranking used by every company listing.
const COMPANY_ORDER: &str = "ORDER BY c.strategic_fit_score DESC NULLS LAST,
    c.ai_washing_score DESC NULLS LAST, c.updated_at DESC";

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Storage {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StartupIntelError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        let storage = Self {
            db,
            conn,
            readonly: false,
        };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open an existing database at `path` for queries only.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StartupIntelError::Storage(format!(
                "database not found at {} (run `startupintel discover` first)",
                path.display()
            )));
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn
                    .execute_batch(migration.sql)
                    .await
                    .map_err(|e| {
                        StartupIntelError::Storage(format!(
                            "migration v{} failed: {e}",
                            migration.version
                        ))
                    })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(StartupIntelError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Company operations
    // -----------------------------------------------------------------------

    /// Insert or merge a company by identity key. Returns the row id.
    pub async fn upsert_company(&self, record: &CompanyRecord) -> Result<i64> {
        self.check_writable()?;

        let key = record.identity_key();
        if key.is_empty() {
            return Err(StartupIntelError::validation(format!(
                "company {:?} has no usable identity key",
                record.name
            )));
        }

        let keywords_json = (!record.keywords.is_empty())
            .then(|| serde_json::to_string(&record.keywords))
            .transpose()
            .map_err(|e| StartupIntelError::Storage(format!("keywords: {e}")))?;
        let postings_json = (!record.job_postings.is_empty())
            .then(|| serde_json::to_string(&record.job_postings))
            .transpose()
            .map_err(|e| StartupIntelError::Storage(format!("job postings: {e}")))?;

        let analysis = &record.analysis;
        let now = timestamp(Utc::now());

        let mut rows = self
            .conn
            .query(
                "INSERT INTO companies (identity_key, name, website, source, source_article,
                    description, location, funding_stage, employees_count, founded_year, batch,
                    keywords_json, job_postings_json, ai_washing_score, strategic_fit_score,
                    healthcare_relevance, analysis_error, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?18)
                 ON CONFLICT(identity_key) DO UPDATE SET
                   name = excluded.name,
                   website = COALESCE(excluded.website, companies.website),
                   source_article = COALESCE(excluded.source_article, companies.source_article),
                   description = COALESCE(excluded.description, companies.description),
                   location = COALESCE(excluded.location, companies.location),
                   funding_stage = COALESCE(excluded.funding_stage, companies.funding_stage),
                   employees_count = COALESCE(excluded.employees_count, companies.employees_count),
                   founded_year = COALESCE(excluded.founded_year, companies.founded_year),
                   batch = COALESCE(excluded.batch, companies.batch),
                   keywords_json = COALESCE(excluded.keywords_json, companies.keywords_json),
                   job_postings_json = COALESCE(excluded.job_postings_json, companies.job_postings_json),
                   ai_washing_score = COALESCE(excluded.ai_washing_score, companies.ai_washing_score),
                   strategic_fit_score = CASE
                     WHEN excluded.analysis_error IS NOT NULL THEN excluded.strategic_fit_score
                     ELSE COALESCE(excluded.strategic_fit_score, companies.strategic_fit_score)
                   END,
                   healthcare_relevance = excluded.healthcare_relevance,
                   analysis_error = excluded.analysis_error,
                   updated_at = excluded.updated_at
                 RETURNING id",
                params![
                    key.as_str(),
                    record.name.as_str(),
                    record.website(),
                    record.source.as_str(),
                    record.source_article.as_deref(),
                    record.description.as_deref(),
                    record.location.as_deref(),
                    record.funding_stage.as_deref(),
                    record.employees_count.map(i64::from),
                    record.founded_year.map(i64::from),
                    record.batch.as_deref(),
                    keywords_json,
                    postings_json,
                    analysis.ai_washing_score.map(i64::from),
                    analysis.strategic_fit_score.map(i64::from),
                    i64::from(analysis.healthcare_relevance),
                    analysis.analysis_error.as_deref(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        let id = match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map_err(|e| StartupIntelError::Storage(e.to_string()))?,
            Ok(None) => {
                return Err(StartupIntelError::Storage(format!(
                    "upsert of {key} returned no row"
                )));
            }
            Err(e) => return Err(StartupIntelError::Storage(e.to_string())),
        };

        if let Some(github) = &analysis.github_analysis {
            self.upsert_intelligence(id, github).await?;
        }
        if let Some(funding) = &record.funding_info {
            self.upsert_funding(id, funding).await?;
        }

        debug!(id, %key, "company upserted");
        Ok(id)
    }

    async fn upsert_intelligence(&self, company_id: i64, github: &GithubAnalysis) -> Result<()> {
        let json = serde_json::to_string(github)
            .map_err(|e| StartupIntelError::Storage(format!("github analysis: {e}")))?;
        self.conn
            .execute(
                "INSERT INTO company_intelligence
                    (company_id, github_analysis_json, ml_contributions_score, analyzed_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(company_id) DO UPDATE SET
                   github_analysis_json = excluded.github_analysis_json,
                   ml_contributions_score = excluded.ml_contributions_score,
                   analyzed_at = excluded.analyzed_at",
                params![
                    company_id,
                    json,
                    i64::from(github.ml_contributions_score),
                    timestamp(github.analysis_date),
                ],
            )
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;
        Ok(())
    }

    /// One row per company and round type; later reports fill in missing details.
    async fn upsert_funding(&self, company_id: i64, funding: &FundingInfo) -> Result<()> {
        let round_type = funding.round_type.trim();
        if round_type.is_empty() {
            debug!(company_id, "funding info without round type, skipped");
            return Ok(());
        }
        let amount = funding.amount_usd.and_then(|a| i64::try_from(a).ok());
        let now = timestamp(Utc::now());
        self.conn
            .execute(
                "INSERT INTO funding_rounds
                    (company_id, round_type, amount_usd, lead_investor, announced_date,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(company_id, round_type) DO UPDATE SET
                   amount_usd = COALESCE(excluded.amount_usd, funding_rounds.amount_usd),
                   lead_investor = COALESCE(excluded.lead_investor, funding_rounds.lead_investor),
                   announced_date = COALESCE(excluded.announced_date, funding_rounds.announced_date),
                   updated_at = excluded.updated_at",
                params![
                    company_id,
                    round_type,
                    amount,
                    funding.lead_investor.as_deref(),
                    funding.announced_date.as_deref(),
                    now.as_str(),
                ],
            )
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Highest-ranked companies matching `filter`.
    pub async fn top_companies(
        &self,
        limit: u32,
        filter: &CompanyFilter,
    ) -> Result<Vec<StoredCompany>> {
        let sql = format!(
            "SELECT {COMPANY_COLUMNS}
             FROM companies c
             LEFT JOIN company_intelligence ci ON ci.company_id = c.id
             WHERE (?1 = 0 OR c.healthcare_relevance = 1)
               AND (?2 IS NULL OR c.ai_washing_score >= ?2)
               AND (?3 IS NULL OR c.strategic_fit_score >= ?3)
               AND (?4 IS NULL OR LOWER(COALESCE(c.location, '')) LIKE '%' || LOWER(?4) || '%')
             {COMPANY_ORDER}
             LIMIT ?5"
        );
        let rows = self
            .conn
            .query(
                &sql,
                params![
                    i64::from(filter.healthcare_only),
                    filter.min_ai_washing_score.map(i64::from),
                    filter.min_strategic_fit_score.map(i64::from),
                    filter.location.as_deref(),
                    i64::from(limit),
                ],
            )
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        collect_companies(rows).await
    }

    /// Companies whose name or description contains `query` (case-insensitive).
    pub async fn search_companies(&self, query: &str, limit: u32) -> Result<Vec<StoredCompany>> {
        let pattern = format!("%{}%", query.trim().to_lowercase());
        let sql = format!(
            "SELECT {COMPANY_COLUMNS}
             FROM companies c
             LEFT JOIN company_intelligence ci ON ci.company_id = c.id
             WHERE LOWER(c.name) LIKE ?1 OR LOWER(COALESCE(c.description, '')) LIKE ?1
             {COMPANY_ORDER}
             LIMIT ?2"
        );
        let rows = self
            .conn
            .query(&sql, params![pattern, i64::from(limit)])
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        collect_companies(rows).await
    }

    /// Total number of stored companies.
    pub async fn company_count(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM companies", params![])
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0) as u64),
            Ok(None) => Ok(0),
            Err(e) => Err(StartupIntelError::Storage(e.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Run history
    // -----------------------------------------------------------------------

    /// Record one discovery run. Returns the generated run ID.
    pub async fn record_run(
        &self,
        stats: &RunStatistics,
        success: bool,
        error: Option<&str>,
    ) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let run_date = timestamp(stats.run_start_time.unwrap_or_else(Utc::now));
        self.conn
            .execute(
                "INSERT INTO discovery_runs (id, run_date, companies_discovered, unique_companies,
                    companies_analyzed, high_potential_targets, ai_washing_filtered,
                    analysis_failures, source_failures, runtime_seconds, success, error_message)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    id.as_str(),
                    run_date,
                    stats.companies_discovered as i64,
                    stats.unique_companies as i64,
                    stats.companies_analyzed as i64,
                    stats.high_potential_targets as i64,
                    stats.ai_washing_filtered as i64,
                    stats.analysis_failures as i64,
                    stats.source_failures as i64,
                    stats.runtime_seconds(),
                    i64::from(success),
                    error,
                ],
            )
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;
        Ok(id)
    }

    /// Aggregates over runs started within the last `days` days.
    pub async fn run_history(&self, days: u32) -> Result<RunHistorySummary> {
        let cutoff = timestamp(Utc::now() - Duration::days(i64::from(days)));
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*), COALESCE(SUM(success), 0), AVG(companies_discovered),
                        AVG(companies_analyzed), AVG(high_potential_targets), AVG(runtime_seconds)
                 FROM discovery_runs WHERE run_date >= ?1",
                params![cutoff],
            )
            .await
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(RunHistorySummary {
                total_runs: row.get::<i64>(0).unwrap_or(0) as u64,
                successful_runs: row.get::<i64>(1).unwrap_or(0) as u64,
                avg_discovered: row.get::<f64>(2).unwrap_or(0.0),
                avg_analyzed: row.get::<f64>(3).unwrap_or(0.0),
                avg_targets: row.get::<f64>(4).unwrap_or(0.0),
                avg_runtime_seconds: row.get::<f64>(5).unwrap_or(0.0),
            }),
            Ok(None) => Ok(RunHistorySummary::default()),
            Err(e) => Err(StartupIntelError::Storage(e.to_string())),
        }
    }
}

/// Fixed-width RFC 3339 so stored timestamps sort lexically.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

async fn collect_companies(mut rows: libsql::Rows) -> Result<Vec<StoredCompany>> {
    let mut results = Vec::new();
    while let Ok(Some(row)) = rows.next().await {
        results.push(row_to_company(&row)?);
    }
    Ok(results)
}

/// Convert a database row (selected with [`COMPANY_COLUMNS`]) to a [`StoredCompany`].
fn row_to_company(row: &libsql::Row) -> Result<StoredCompany> {
    let keywords: BTreeSet<String> = match row.get::<String>(11).ok() {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StartupIntelError::Storage(format!("invalid keywords: {e}")))?,
        None => BTreeSet::new(),
    };
    let job_postings: Vec<JobPosting> = match row.get::<String>(12).ok() {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| StartupIntelError::Storage(format!("invalid job postings: {e}")))?,
        None => Vec::new(),
    };
    let github_analysis: Option<GithubAnalysis> = match row.get::<String>(18).ok() {
        Some(json) => Some(
            serde_json::from_str(&json)
                .map_err(|e| StartupIntelError::Storage(format!("invalid github analysis: {e}")))?,
        ),
        None => None,
    };
    let funding_info: Option<FundingInfo> = match row.get::<String>(19).ok() {
        Some(json) => Some(
            serde_json::from_str(&json)
                .map_err(|e| StartupIntelError::Storage(format!("invalid funding info: {e}")))?,
        ),
        None => None,
    };

    let updated_at = {
        let s: String = row
            .get(17)
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StartupIntelError::Storage(format!("invalid date: {e}")))?
    };

    Ok(StoredCompany {
        id: row
            .get::<i64>(0)
            .map_err(|e| StartupIntelError::Storage(e.to_string()))?,
        company: CompanyRecord {
            name: row
                .get::<String>(1)
                .map_err(|e| StartupIntelError::Storage(e.to_string()))?,
            website: row.get::<String>(2).ok(),
            source: row
                .get::<String>(3)
                .map_err(|e| StartupIntelError::Storage(e.to_string()))?,
            source_article: row.get::<String>(4).ok(),
            description: row.get::<String>(5).ok(),
            location: row.get::<String>(6).ok(),
            funding_stage: row.get::<String>(7).ok(),
            funding_info,
            employees_count: row.get::<i64>(8).ok().map(|v| v as u32),
            founded_year: row.get::<i64>(9).ok().map(|v| v as u16),
            batch: row.get::<String>(10).ok(),
            keywords,
            job_postings,
            analysis: CompanyAnalysis {
                ai_washing_score: row.get::<i64>(13).ok().map(|v| v as u8),
                strategic_fit_score: row.get::<i64>(14).ok().map(|v| v as u8),
                healthcare_relevance: row.get::<i64>(15).unwrap_or(0) != 0,
                github_analysis,
                analysis_error: row.get::<String>(16).ok(),
            },
        },
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    /// Create a temp file storage for testing.
    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("si_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn scored(name: &str, website: &str, ai: u8, fit: u8) -> CompanyRecord {
        let mut record = CompanyRecord::new(name, "test").with_website(website);
        record.analysis.ai_washing_score = Some(ai);
        record.analysis.strategic_fit_score = Some(fit);
        record
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        let version = storage.get_schema_version().await;
        assert_eq!(version, 2);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("si_test_{}.db", Uuid::now_v7()));
        let _s1 = Storage::open(&tmp).await.expect("first open");
        drop(_s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 2);
    }

    #[tokio::test]
    async fn upsert_merges_across_sources() {
        let storage = test_storage().await;

        let mut first = CompanyRecord::new("Acme", "yc")
            .with_website("https://acme.com")
            .with_description("Clinical imaging");
        first.location = Some("Seattle".into());
        let id = storage.upsert_company(&first).await.expect("insert");

        let mut second = CompanyRecord::new("Acme", "news").with_website("www.acme.com/about");
        second.employees_count = Some(40);
        second.keywords.insert("healthcare".into());
        let same_id = storage.upsert_company(&second).await.expect("merge");
        assert_eq!(id, same_id);
        assert_eq!(storage.company_count().await.unwrap(), 1);

        let stored = storage
            .top_companies(10, &CompanyFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        let company = &stored[0].company;
        assert_eq!(company.description.as_deref(), Some("Clinical imaging"));
        assert_eq!(company.location.as_deref(), Some("Seattle"));
        assert_eq!(company.employees_count, Some(40));
        assert!(company.keywords.contains("healthcare"));
    }

    #[tokio::test]
    async fn failed_reanalysis_clears_stale_fit() {
        let storage = test_storage().await;
        storage.upsert_company(&scored("Acme", "acme.com", 8, 9)).await.unwrap();

        let mut failed = CompanyRecord::new("Acme", "test").with_website("acme.com");
        failed.mark_analysis_failed("HTTP 502", false);
        storage.upsert_company(&failed).await.unwrap();

        let stored = storage
            .top_companies(10, &CompanyFilter::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
        let analysis = &stored[0].company.analysis;
        assert_eq!(analysis.ai_washing_score, Some(0));
        assert_eq!(analysis.strategic_fit_score, None);
        assert_eq!(analysis.analysis_error.as_deref(), Some("HTTP 502"));

        // A later success scores it again
        storage.upsert_company(&scored("Acme", "acme.com", 7, 6)).await.unwrap();
        let stored = storage
            .top_companies(10, &CompanyFilter::default())
            .await
            .unwrap();
        assert_eq!(stored[0].company.analysis.strategic_fit_score, Some(6));
        assert!(stored[0].company.analysis.analysis_error.is_none());
    }

    #[tokio::test]
    async fn funding_rounds_merge_and_read_back() {
        let storage = test_storage().await;
        let mut first = CompanyRecord::new("Acme", "news").with_website("acme.com");
        first.funding_info = Some(FundingInfo {
            round_type: "Series A".into(),
            amount_usd: Some(12_000_000),
            lead_investor: None,
            announced_date: Some("2024-03-01".into()),
        });
        let id = storage.upsert_company(&first).await.unwrap();

        let mut second = CompanyRecord::new("Acme", "vc-feed").with_website("acme.com");
        second.funding_info = Some(FundingInfo {
            round_type: "Series A".into(),
            lead_investor: Some("Madrona".into()),
            ..Default::default()
        });
        storage.upsert_company(&second).await.unwrap();
        // Records without funding leave the stored round alone
        storage
            .upsert_company(&CompanyRecord::new("Acme", "yc").with_website("acme.com"))
            .await
            .unwrap();

        let stored = storage
            .top_companies(10, &CompanyFilter::default())
            .await
            .unwrap();
        assert_eq!(stored[0].id, id);
        let funding = stored[0].company.funding_info.as_ref().expect("funding stored");
        assert_eq!(funding.round_type, "Series A");
        assert_eq!(funding.amount_usd, Some(12_000_000));
        assert_eq!(funding.lead_investor.as_deref(), Some("Madrona"));
        assert_eq!(funding.announced_date.as_deref(), Some("2024-03-01"));

        let mut rows = storage
            .conn
            .query("SELECT COUNT(*) FROM funding_rounds", params![])
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_rejects_empty_identity() {
        let storage = test_storage().await;
        let err = storage
            .upsert_company(&CompanyRecord::new("  ", "test"))
            .await
            .unwrap_err();
        assert!(matches!(err, StartupIntelError::Validation { .. }));
    }

    #[tokio::test]
    async fn github_analysis_round_trips() {
        let storage = test_storage().await;
        let mut record = scored("Acme", "acme.com", 7, 6);
        let mut github = GithubAnalysis::not_found(Utc::now());
        github.organization_found = true;
        github.organization_name = Some("acme".into());
        github.ml_contributions_score = 8;
        record.analysis.github_analysis = Some(github);
        storage.upsert_company(&record).await.unwrap();

        let stored = storage
            .top_companies(1, &CompanyFilter::default())
            .await
            .unwrap();
        let github = stored[0].company.analysis.github_analysis.as_ref().unwrap();
        assert_eq!(github.organization_name.as_deref(), Some("acme"));
        assert_eq!(github.ml_contributions_score, 8);
    }

    #[tokio::test]
    async fn top_companies_ranked_with_unscored_last() {
        let storage = test_storage().await;
        storage
            .upsert_company(&CompanyRecord::new("Unscored", "test").with_website("u.io"))
            .await
            .unwrap();
        storage.upsert_company(&scored("Mid", "mid.io", 5, 6)).await.unwrap();
        storage.upsert_company(&scored("TopA", "a.io", 6, 9)).await.unwrap();
        storage.upsert_company(&scored("TopB", "b.io", 8, 9)).await.unwrap();

        let names: Vec<String> = storage
            .top_companies(10, &CompanyFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.company.name)
            .collect();
        assert_eq!(names, ["TopB", "TopA", "Mid", "Unscored"]);

        let limited = storage
            .top_companies(2, &CompanyFilter::default())
            .await
            .unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn top_companies_filters() {
        let storage = test_storage().await;
        let mut seattle = scored("Seattle Health", "sh.io", 7, 8);
        seattle.location = Some("Seattle, WA".into());
        seattle.analysis.healthcare_relevance = true;
        storage.upsert_company(&seattle).await.unwrap();
        storage.upsert_company(&scored("Elsewhere", "e.io", 3, 8)).await.unwrap();

        let healthcare = CompanyFilter {
            healthcare_only: true,
            ..Default::default()
        };
        assert_eq!(storage.top_companies(10, &healthcare).await.unwrap().len(), 1);

        let min_ai = CompanyFilter {
            min_ai_washing_score: Some(6),
            ..Default::default()
        };
        let found = storage.top_companies(10, &min_ai).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].company.name, "Seattle Health");

        let location = CompanyFilter {
            location: Some("seattle".into()),
            ..Default::default()
        };
        assert_eq!(storage.top_companies(10, &location).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_by_name_or_description() {
        let storage = test_storage().await;
        storage
            .upsert_company(
                &CompanyRecord::new("Radiant", "test")
                    .with_website("radiant.ai")
                    .with_description("Radiology triage models"),
            )
            .await
            .unwrap();
        storage
            .upsert_company(&CompanyRecord::new("ShipFast", "test").with_website("shipfast.io"))
            .await
            .unwrap();

        let hits = storage.search_companies("RADIOLOGY", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].company.name, "Radiant");
        assert_eq!(storage.search_companies("ship", 10).await.unwrap().len(), 1);
        assert!(storage.search_companies("nothing", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn run_history_aggregates() {
        let storage = test_storage().await;
        let empty = storage.run_history(30).await.unwrap();
        assert_eq!(empty.total_runs, 0);

        let start = Utc::now();
        let stats = RunStatistics {
            companies_discovered: 10,
            companies_analyzed: 8,
            high_potential_targets: 2,
            run_start_time: Some(start),
            run_end_time: Some(start + Duration::seconds(4)),
            ..Default::default()
        };
        storage.record_run(&stats, true, None).await.unwrap();
        let failed = RunStatistics {
            companies_discovered: 20,
            run_start_time: Some(start),
            ..Default::default()
        };
        storage
            .record_run(&failed, false, Some("database locked"))
            .await
            .unwrap();

        let summary = storage.run_history(30).await.unwrap();
        assert_eq!(summary.total_runs, 2);
        assert_eq!(summary.successful_runs, 1);
        assert!((summary.avg_discovered - 15.0).abs() < 1e-9);
        assert!((summary.avg_runtime_seconds - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn readonly_rejects_writes() {
        let tmp = std::env::temp_dir().join(format!("si_test_{}.db", Uuid::now_v7()));
        let rw = Storage::open(&tmp).await.unwrap();
        rw.upsert_company(&CompanyRecord::new("Acme", "test"))
            .await
            .unwrap();
        drop(rw);

        let ro = Storage::open_readonly(&tmp).await.unwrap();
        assert_eq!(ro.company_count().await.unwrap(), 1);
        let result = ro.upsert_company(&CompanyRecord::new("Other", "test")).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("read-only"));
    }

    #[tokio::test]
    async fn readonly_requires_existing_db() {
        let tmp = std::env::temp_dir().join(format!("si_missing_{}.db", Uuid::now_v7()));
        assert!(Storage::open_readonly(&tmp).await.is_err());
    }
}
