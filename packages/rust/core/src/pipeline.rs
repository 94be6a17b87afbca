//! Discovery run: collect → deduplicate → analyze → persist → report.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use startupintel_analysis::{CompanyScorer, is_healthcare_relevant};
use startupintel_discovery::{Collector, SourceOutcome, aggregate, dedup_companies, run_collectors};
use startupintel_shared::{
    CompanyFilter, CompanyRecord, DiscoveryReport, PipelineConfig, Result, RunStatistics,
    StartupIntelError,
};

use crate::report::build_report;
use crate::store::CompanyStore;

/// Where a run currently is. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Discovering,
    Deduplicating,
    Analyzing,
    Reporting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Discovering => "discovering",
            Self::Deduplicating => "deduplicating",
            Self::Analyzing => "analyzing",
            Self::Reporting => "reporting",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once per collector; `count` is `None` when the source failed.
    fn source_collected(&self, source: &str, count: Option<usize>);
    /// Called after each company is scored (or marked failed).
    fn company_analyzed(&self, record: &CompanyRecord, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &DiscoveryReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn source_collected(&self, _source: &str, _count: Option<usize>) {}
    fn company_analyzed(&self, _record: &CompanyRecord, _current: usize, _total: usize) {}
    fn done(&self, _report: &DiscoveryReport) {}
}

// ---------------------------------------------------------------------------
// DiscoveryPipeline
// ---------------------------------------------------------------------------

/// Runs discovery end to end. One run at a time; `run` takes `&mut self`.
pub struct DiscoveryPipeline {
    collectors: Vec<Arc<dyn Collector>>,
    analyzer: Arc<dyn CompanyScorer>,
    store: Arc<dyn CompanyStore>,
    config: PipelineConfig,
    cancel: CancellationToken,
    state: RunState,
}

impl DiscoveryPipeline {
    pub fn new(
        collectors: Vec<Arc<dyn Collector>>,
        analyzer: Arc<dyn CompanyScorer>,
        store: Arc<dyn CompanyStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            collectors,
            analyzer,
            store,
            config,
            cancel: CancellationToken::new(),
            state: RunState::Idle,
        }
    }

    /// Use an externally owned token (e.g. one cancelled on Ctrl-C).
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle that aborts the run at the next stage boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn enter(&mut self, state: RunState) {
        info!(from = %self.state, to = %state, "run state");
        self.state = state;
    }

    fn checkpoint(&mut self) -> Result<()> {
        if self.cancel.is_cancelled() {
            warn!(state = %self.state, "run cancelled");
            self.state = RunState::Failed;
            return Err(StartupIntelError::Cancelled);
        }
        Ok(())
    }

    /// Execute one discovery run.
    ///
    /// Source and per-company failures are recorded in the statistics and the
    /// run continues. Invalid configuration, cancellation, persistence failures
    /// and run-fatal scorer errors end the run in [`RunState::Failed`] and are
    /// returned as errors.
    #[instrument(skip_all, fields(collectors = self.collectors.len()))]
    pub async fn run(&mut self, progress: &dyn ProgressReporter) -> Result<DiscoveryReport> {
        self.state = RunState::Idle;

        if let Err(e) = self.config.validate() {
            self.enter(RunState::Failed);
            return Err(e);
        }

        let mut stats = RunStatistics {
            run_start_time: Some(Utc::now()),
            ..Default::default()
        };

        // --- Discovering ---
        self.checkpoint()?;
        self.enter(RunState::Discovering);
        progress.phase("Collecting companies");
        let outcomes = run_collectors(&self.collectors, self.config.collector_concurrency).await;
        for outcome in &outcomes {
            let count = match outcome {
                SourceOutcome::Collected { records, .. } => Some(records.len()),
                SourceOutcome::Failed { .. } => None,
            };
            progress.source_collected(outcome.source(), count);
        }
        let collected = aggregate(outcomes);
        stats.companies_discovered = collected.discovered;
        stats.source_failures = collected.failures.len();

        // --- Deduplicating ---
        self.checkpoint()?;
        self.enter(RunState::Deduplicating);
        progress.phase("Deduplicating");
        let unique = dedup_companies(collected.records);
        stats.unique_companies = unique.len();
        info!(
            discovered = stats.companies_discovered,
            unique = stats.unique_companies,
            source_failures = stats.source_failures,
            "collection complete"
        );

        // --- Analyzing ---
        self.checkpoint()?;
        self.enter(RunState::Analyzing);
        progress.phase("Analyzing companies");
        let analyzed =
            match analyze_all(self.analyzer.as_ref(), &self.config, unique, &mut stats, progress)
                .await
            {
                Ok(analyzed) => analyzed,
                Err(e) => {
                    self.enter(RunState::Failed);
                    return Err(e);
                }
            };

        // --- Reporting ---
        self.checkpoint()?;
        self.enter(RunState::Reporting);
        progress.phase("Saving results");
        match self.persist(&analyzed, &mut stats).await {
            Ok(report) => {
                self.enter(RunState::Done);
                progress.done(&report);
                info!(
                    analyzed = report.statistics.companies_analyzed,
                    high_potential = report.statistics.high_potential_targets,
                    runtime_seconds = report.runtime_seconds,
                    "discovery run complete"
                );
                Ok(report)
            }
            Err(e) => {
                self.enter(RunState::Failed);
                stats.run_end_time = Some(Utc::now());
                let message = e.to_string();
                if let Err(record_err) = self.store.record_run(&stats, false, Some(&message)).await
                {
                    warn!(error = %record_err, "could not record failed run");
                }
                Err(e)
            }
        }
    }

    async fn persist(
        &self,
        analyzed: &[CompanyRecord],
        stats: &mut RunStatistics,
    ) -> Result<DiscoveryReport> {
        for record in analyzed {
            self.store.upsert_company(record).await?;
        }
        info!(count = analyzed.len(), "companies stored");

        let top_targets = self
            .store
            .top_companies(self.config.top_n, &CompanyFilter::default())
            .await?;

        stats.run_end_time = Some(Utc::now());
        self.store.record_run(stats, true, None).await?;

        let date = stats.run_start_time.unwrap_or_else(Utc::now);
        Ok(build_report(date, stats.clone(), top_targets))
    }
}

/// Score every record, keeping failed ones flagged. Counters are folded in
/// completion order on this task only.
///
/// A per-company error keeps the record; a run-fatal error stops the stage.
async fn analyze_all(
    analyzer: &dyn CompanyScorer,
    config: &PipelineConfig,
    records: Vec<CompanyRecord>,
    stats: &mut RunStatistics,
    progress: &dyn ProgressReporter,
) -> Result<Vec<CompanyRecord>> {
    let total = records.len();
    let now = Utc::now();

    let mut scored = stream::iter(records.into_iter().map(|record| async move {
        let result = analyzer.score_company(&record, now).await;
        (record, result)
    }))
    .buffered(config.analysis_concurrency.max(1));

    let mut analyzed = Vec::with_capacity(total);
    while let Some((mut record, result)) = scored.next().await {
        match result {
            Ok(scores) => {
                let ai = scores.ai_washing_score;
                let fit = scores.strategic_fit_score;
                record.apply_scores(scores);
                stats.companies_analyzed += 1;
                if ai >= config.min_ai_washing_score && fit >= config.high_potential_fit_score {
                    stats.high_potential_targets += 1;
                }
                if ai < config.min_ai_washing_score {
                    stats.ai_washing_filtered += 1;
                }
            }
            Err(e) if e.is_run_fatal() => {
                warn!(company = %record.name, error = %e, "analysis stage aborted");
                return Err(e);
            }
            Err(e) => {
                warn!(company = %record.name, error = %e, "analysis failed, keeping record");
                let healthcare = is_healthcare_relevant(&record);
                record.mark_analysis_failed(e.to_string(), healthcare);
                stats.analysis_failures += 1;
            }
        }
        progress.company_analyzed(&record, analyzed.len() + 1, total);
        analyzed.push(record);
    }

    Ok(analyzed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::DateTime;
    use startupintel_analysis::{CompanyAnalyzer, NoContent, OrgIdentity, OrgResolver, RepoFetcher};
    use startupintel_discovery::StaticCollector;
    use startupintel_shared::{CompanyScores, RepoMetadata, StoredCompany, TargetCriteria};
    use startupintel_storage::Storage;

    use crate::report::rank_companies;

    // -----------------------------------------------------------------------
    // Fakes
    // -----------------------------------------------------------------------

    /// Resolves only the company named "Broken", whose repositories then fail to load.
    struct BrokenOrgOnly;

    #[async_trait]
    impl OrgResolver for BrokenOrgOnly {
        async fn resolve(&self, record: &CompanyRecord) -> Result<Option<OrgIdentity>> {
            Ok((record.name == "Broken").then(|| OrgIdentity::new("broken")))
        }
    }

    /// Fails for the company named "Broken" with `error`, scores the rest normally.
    struct FailsForBroken {
        inner: CompanyAnalyzer,
        error: fn() -> StartupIntelError,
    }

    impl FailsForBroken {
        fn with(error: fn() -> StartupIntelError) -> Arc<Self> {
            Arc::new(Self {
                inner: offline_analyzer(),
                error,
            })
        }
    }

    #[async_trait]
    impl CompanyScorer for FailsForBroken {
        async fn score_company(
            &self,
            record: &CompanyRecord,
            now: DateTime<Utc>,
        ) -> Result<CompanyScores> {
            if record.name == "Broken" {
                return Err((self.error)());
            }
            self.inner.analyze_at(record, now).await
        }
    }

    struct UnreachableRepos;

    #[async_trait]
    impl RepoFetcher for UnreachableRepos {
        async fn fetch_repos(&self, _org: &OrgIdentity) -> Result<Vec<RepoMetadata>> {
            Err(StartupIntelError::Network("HTTP 502".into()))
        }
    }

    struct FailingCollector;

    #[async_trait]
    impl Collector for FailingCollector {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn collect(&self) -> Result<Vec<CompanyRecord>> {
            Err(StartupIntelError::Network("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        companies: Mutex<Vec<StoredCompany>>,
        runs: Mutex<Vec<(RunStatistics, bool, Option<String>)>>,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl CompanyStore for MemoryStore {
        async fn upsert_company(&self, record: &CompanyRecord) -> Result<i64> {
            if self.fail_writes {
                return Err(StartupIntelError::Storage("database is locked".into()));
            }
            let mut companies = self.companies.lock().unwrap();
            let key = record.identity_key();
            if let Some(existing) = companies
                .iter_mut()
                .find(|c| c.company.identity_key() == key)
            {
                existing.company = record.clone();
                existing.updated_at = Utc::now();
                return Ok(existing.id);
            }
            let id = companies.len() as i64 + 1;
            companies.push(StoredCompany {
                id,
                company: record.clone(),
                updated_at: Utc::now(),
            });
            Ok(id)
        }

        async fn top_companies(
            &self,
            limit: u32,
            _filter: &CompanyFilter,
        ) -> Result<Vec<StoredCompany>> {
            let mut companies = self.companies.lock().unwrap().clone();
            rank_companies(&mut companies);
            companies.truncate(limit as usize);
            Ok(companies)
        }

        async fn record_run(
            &self,
            stats: &RunStatistics,
            success: bool,
            error: Option<&str>,
        ) -> Result<String> {
            self.runs
                .lock()
                .unwrap()
                .push((stats.clone(), success, error.map(str::to_string)));
            Ok("run-1".into())
        }
    }

    fn offline_analyzer() -> CompanyAnalyzer {
        CompanyAnalyzer::new(
            Arc::new(NoContent),
            Arc::new(BrokenOrgOnly),
            Arc::new(UnreachableRepos),
            TargetCriteria::default(),
        )
    }

    fn analyzer() -> Arc<dyn CompanyScorer> {
        Arc::new(offline_analyzer())
    }

    fn source(name: &str, records: Vec<CompanyRecord>) -> Arc<dyn Collector> {
        Arc::new(StaticCollector::new(name, records))
    }

    fn company(name: &str, website: Option<&str>) -> CompanyRecord {
        let record = CompanyRecord::new(name, "test");
        match website {
            Some(w) => record.with_website(w),
            None => record,
        }
    }

    fn pipeline(collectors: Vec<Arc<dyn Collector>>, store: Arc<MemoryStore>) -> DiscoveryPipeline {
        DiscoveryPipeline::new(collectors, analyzer(), store, PipelineConfig::default())
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn deduplicates_across_sources() {
        let store = Arc::new(MemoryStore::default());
        let mut run = pipeline(
            vec![
                source(
                    "first",
                    vec![company("A", Some("foo.com")), company("Foo", None)],
                ),
                source("second", vec![company("A again", Some("https://www.foo.com"))]),
                source("third", vec![company("C", Some("bar.io"))]),
            ],
            store.clone(),
        );

        let report = run.run(&SilentProgress).await.expect("run succeeds");

        assert_eq!(run.state(), RunState::Done);
        assert_eq!(report.statistics.companies_discovered, 4);
        assert_eq!(report.statistics.unique_companies, 3);
        assert_eq!(report.statistics.companies_analyzed, 3);

        let mut names: Vec<String> = store
            .companies
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.company.name.clone())
            .collect();
        names.sort();
        assert_eq!(names, ["A", "C", "Foo"]);

        let runs = store.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].1);
    }

    #[tokio::test]
    async fn failed_source_does_not_reduce_other_sources() {
        let store = Arc::new(MemoryStore::default());
        let mut run = pipeline(
            vec![
                source("a", vec![company("One", Some("one.io")), company("Two", Some("two.io"))]),
                Arc::new(FailingCollector),
                source("b", vec![company("Three", Some("three.io"))]),
            ],
            store,
        );

        let report = run.run(&SilentProgress).await.unwrap();
        assert_eq!(report.statistics.companies_discovered, 3);
        assert_eq!(report.statistics.source_failures, 1);
        assert!(report.recommendations.iter().any(|r| r.contains("source(s) failed")));
    }

    #[tokio::test]
    async fn analysis_failure_keeps_record_flagged_in_report() {
        let store = Arc::new(MemoryStore::default());
        let broken = company("Broken", Some("broken.io")).with_description("Hospital scheduling");
        let mut run = DiscoveryPipeline::new(
            vec![source("a", vec![broken, company("Fine", Some("fine.io"))])],
            FailsForBroken::with(|| StartupIntelError::analysis("Broken", "HTTP 502 from scorer")),
            store,
            PipelineConfig::default(),
        );

        let report = run.run(&SilentProgress).await.unwrap();
        assert_eq!(report.statistics.analysis_failures, 1);
        assert_eq!(report.statistics.companies_analyzed, 1);

        let flagged: Vec<_> = report
            .top_targets
            .iter()
            .filter(|c| c.company.name == "Broken")
            .collect();
        assert_eq!(flagged.len(), 1);
        let analysis = &flagged[0].company.analysis;
        assert_eq!(analysis.ai_washing_score, Some(0));
        assert_eq!(analysis.strategic_fit_score, None);
        assert!(analysis.healthcare_relevance);
        assert!(analysis.analysis_error.as_deref().unwrap().contains("502"));
    }

    #[tokio::test]
    async fn repo_listing_failure_still_scores_company() {
        let store = Arc::new(MemoryStore::default());
        let broken = company("Broken", Some("broken.io"));
        let mut run = pipeline(vec![source("a", vec![broken])], store);

        let report = run.run(&SilentProgress).await.unwrap();
        assert_eq!(report.statistics.analysis_failures, 0);
        assert_eq!(report.statistics.companies_analyzed, 1);
        let analysis = &report.top_targets[0].company.analysis;
        assert_eq!(analysis.ai_washing_score, Some(3));
        assert!(analysis.analysis_error.is_none());
    }

    #[tokio::test]
    async fn run_fatal_scorer_error_fails_run() {
        let store = Arc::new(MemoryStore::default());
        let mut run = DiscoveryPipeline::new(
            vec![source("a", vec![company("Broken", Some("broken.io"))])],
            FailsForBroken::with(|| StartupIntelError::Storage("cache database is locked".into())),
            store.clone(),
            PipelineConfig::default(),
        );

        let err = run.run(&SilentProgress).await.unwrap_err();
        assert!(matches!(err, StartupIntelError::Storage(_)));
        assert_eq!(run.state(), RunState::Failed);
        assert!(store.companies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn absent_data_companies_count_as_filtered() {
        let store = Arc::new(MemoryStore::default());
        let mut run = pipeline(vec![source("a", vec![company("Quiet", Some("quiet.io"))])], store);

        let report = run.run(&SilentProgress).await.unwrap();
        assert_eq!(report.statistics.ai_washing_filtered, 1);
        assert_eq!(report.statistics.high_potential_targets, 0);
        assert_eq!(report.top_targets.len(), 1);
        assert_eq!(
            report.top_targets[0].company.analysis.ai_washing_score,
            Some(3)
        );
        assert!(report.recommendations.iter().any(|r| r.contains("AI-washing")));
    }

    #[tokio::test]
    async fn cancelled_run_produces_no_report() {
        let store = Arc::new(MemoryStore::default());
        let mut run = pipeline(vec![source("a", vec![company("A", Some("a.io"))])], store.clone());
        run.cancellation_token().cancel();

        let err = run.run(&SilentProgress).await.unwrap_err();
        assert!(matches!(err, StartupIntelError::Cancelled));
        assert_eq!(run.state(), RunState::Failed);
        assert!(store.companies.lock().unwrap().is_empty());
        assert!(store.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_fails_run_and_records_it() {
        let store = Arc::new(MemoryStore::failing());
        let mut run = pipeline(vec![source("a", vec![company("A", Some("a.io"))])], store.clone());

        let err = run.run(&SilentProgress).await.unwrap_err();
        assert!(matches!(err, StartupIntelError::Storage(_)));
        assert_eq!(run.state(), RunState::Failed);

        let runs = store.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert!(!runs[0].1);
        assert!(runs[0].2.as_deref().unwrap().contains("locked"));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_discovering() {
        let store = Arc::new(MemoryStore::default());
        let config = PipelineConfig {
            analysis_concurrency: 0,
            ..PipelineConfig::default()
        };
        let mut run = DiscoveryPipeline::new(
            vec![source("a", vec![company("A", Some("a.io"))])],
            analyzer(),
            store.clone(),
            config,
        );

        let err = run.run(&SilentProgress).await.unwrap_err();
        assert!(matches!(err, StartupIntelError::Config { .. }));
        assert_eq!(run.state(), RunState::Failed);
        assert!(store.runs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn parallel_analysis_keeps_every_record() {
        let store = Arc::new(MemoryStore::default());
        let records: Vec<_> = (0..12)
            .map(|i| company(&format!("Co{i}"), Some(&format!("co{i}.io"))))
            .collect();
        let config = PipelineConfig {
            analysis_concurrency: 4,
            ..PipelineConfig::default()
        };
        let mut run =
            DiscoveryPipeline::new(vec![source("a", records)], analyzer(), store.clone(), config);

        let report = run.run(&SilentProgress).await.unwrap();
        assert_eq!(report.statistics.companies_analyzed, 12);
        assert_eq!(report.top_targets.len(), 10);
        assert_eq!(store.companies.lock().unwrap().len(), 12);
    }

    #[tokio::test]
    async fn runs_against_libsql_storage() {
        let path = std::env::temp_dir().join(format!("si_pipeline_{}.db", uuid::Uuid::now_v7()));
        let storage = Arc::new(Storage::open(&path).await.expect("open db"));
        let mut run = DiscoveryPipeline::new(
            vec![source(
                "a",
                vec![company("Alpha", Some("alpha.io")), company("Beta", Some("beta.io"))],
            )],
            analyzer(),
            storage.clone(),
            PipelineConfig::default(),
        );

        let report = run.run(&SilentProgress).await.unwrap();
        assert_eq!(report.top_targets.len(), 2);
        assert_eq!(storage.company_count().await.unwrap(), 2);
        assert_eq!(storage.run_history(1).await.unwrap().successful_runs, 1);
    }
}
