//! SQL migration definitions for the startupintel database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Initial schema: companies, company_intelligence, discovery_runs",
            sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- One row per identity key; later sources fill in what earlier ones lacked
CREATE TABLE IF NOT EXISTS companies (
    id                   INTEGER PRIMARY KEY AUTOINCREMENT,
    identity_key         TEXT NOT NULL UNIQUE,
    name                 TEXT NOT NULL,
    website              TEXT,
    source               TEXT NOT NULL,
    source_article       TEXT,
    description          TEXT,
    location             TEXT,
    funding_stage        TEXT,
    employees_count      INTEGER,
    founded_year         INTEGER,
    batch                TEXT,
    keywords_json        TEXT,
    job_postings_json    TEXT,
    ai_washing_score     INTEGER,
    strategic_fit_score  INTEGER,
    healthcare_relevance INTEGER NOT NULL DEFAULT 0,
    analysis_error       TEXT,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_companies_fit ON companies(strategic_fit_score);
CREATE INDEX IF NOT EXISTS idx_companies_ai ON companies(ai_washing_score);

-- Technical footprint per company
CREATE TABLE IF NOT EXISTS company_intelligence (
    company_id             INTEGER PRIMARY KEY REFERENCES companies(id) ON DELETE CASCADE,
    github_analysis_json   TEXT NOT NULL,
    ml_contributions_score INTEGER NOT NULL,
    analyzed_at            TEXT NOT NULL
);

-- Discovery run history
CREATE TABLE IF NOT EXISTS discovery_runs (
    id                     TEXT PRIMARY KEY,
    run_date               TEXT NOT NULL,
    companies_discovered   INTEGER NOT NULL,
    unique_companies       INTEGER NOT NULL,
    companies_analyzed     INTEGER NOT NULL,
    high_potential_targets INTEGER NOT NULL,
    ai_washing_filtered    INTEGER NOT NULL,
    analysis_failures      INTEGER NOT NULL,
    source_failures        INTEGER NOT NULL,
    runtime_seconds        REAL NOT NULL,
    success                INTEGER NOT NULL,
    error_message          TEXT
);

CREATE INDEX IF NOT EXISTS idx_discovery_runs_date ON discovery_runs(run_date);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
        },
        Migration {
            version: 2,
            description: "Funding rounds reported by collectors",
            sql: r#"
CREATE TABLE IF NOT EXISTS funding_rounds (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    company_id     INTEGER NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    round_type     TEXT NOT NULL,
    amount_usd     INTEGER,
    lead_investor  TEXT,
    announced_date TEXT,
    created_at     TEXT NOT NULL,
    updated_at     TEXT NOT NULL,
    UNIQUE(company_id, round_type)
);

CREATE INDEX IF NOT EXISTS idx_funding_rounds_company ON funding_rounds(company_id);

INSERT INTO schema_migrations (version) VALUES (2);
"#,
        },
    ]
}
