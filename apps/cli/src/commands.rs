//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use startupintel_analysis::CompanyAnalyzer;
use startupintel_core::{DiscoveryPipeline, ProgressReporter};
use startupintel_crawler::{FetchOptions, GitHubClient, GitHubOptions, HttpFetcher};
use startupintel_discovery::{Collector, SeedFileCollector};
use startupintel_shared::{
    AppConfig, CompanyFilter, CompanyRecord, DiscoveryReport, PipelineConfig, StoredCompany,
    expand_home, init_config, load_config, load_config_from, validate_credentials,
};
use startupintel_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// startupintel — find startups whose AI claims hold up.
#[derive(Parser)]
#[command(
    name = "startupintel",
    version,
    about = "Discover startups, score their AI/ML authenticity, and rank them against a target profile.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.startupintel/startupintel.toml.
    #[arg(long, global = true, env = "STARTUPINTEL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run a discovery: collect, deduplicate, analyze, store, and report.
    Discover {
        /// Extra seed file(s) to collect from, in addition to configured sources.
        #[arg(long)]
        seed: Vec<PathBuf>,

        /// Number of ranked companies in the report (overrides config).
        #[arg(long)]
        top: Option<u32>,

        /// Print the full report as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },

    /// Show the highest-ranked stored companies.
    Top {
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Only healthcare-relevant companies.
        #[arg(long)]
        healthcare: bool,

        /// Minimum AI-washing score.
        #[arg(long)]
        min_ai: Option<u8>,

        /// Minimum strategic fit score.
        #[arg(long)]
        min_fit: Option<u8>,

        /// Location substring, e.g. "seattle".
        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Search stored companies by name or description.
    Search {
        query: String,

        #[arg(short, long, default_value = "20")]
        limit: u32,

        #[arg(long)]
        json: bool,
    },

    /// Summarize stored companies and recent runs.
    Stats {
        /// Look-back window for run history.
        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "startupintel=info",
        1 => "startupintel=debug",
        _ => "startupintel=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Discover { seed, top, json } => cmd_discover(config_path, &seed, top, json).await,
        Command::Top {
            limit,
            healthcare,
            min_ai,
            min_fit,
            location,
            json,
        } => {
            let filter = CompanyFilter {
                healthcare_only: healthcare,
                min_ai_washing_score: min_ai,
                min_strategic_fit_score: min_fit,
                location,
            };
            cmd_top(config_path, limit, &filter, json).await
        }
        Command::Search { query, limit, json } => {
            cmd_search(config_path, &query, limit, json).await
        }
        Command::Stats { days } => cmd_stats(config_path, days).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(config_path),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// discover
// ---------------------------------------------------------------------------

async fn cmd_discover(
    config_path: Option<&Path>,
    seeds: &[PathBuf],
    top: Option<u32>,
    json: bool,
) -> Result<()> {
    // Credentials and targets are checked before anything is collected
    let config = load(config_path)?;
    validate_credentials(&config)?;
    config.targets.validate()?;

    let mut pipeline_config = PipelineConfig::from(&config);
    if let Some(top) = top {
        pipeline_config.top_n = top;
    }

    let collectors = build_collectors(&config, seeds);
    if collectors.is_empty() {
        return Err(eyre!(
            "no sources configured: add [[sources]] to the config file or pass --seed <file>"
        ));
    }

    let pages = Arc::new(HttpFetcher::new(FetchOptions::from(&config.scraping))?);
    let github = Arc::new(GitHubClient::new(
        GitHubOptions::from_config(&config),
        pages.clone(),
    )?);
    let analyzer = Arc::new(
        CompanyAnalyzer::new(pages, github.clone(), github, config.targets.clone())
            .with_max_blog_posts(config.scraping.max_blog_posts),
    );

    let db_path = expand_home(&config.defaults.db_path);
    let storage = Arc::new(Storage::open(&db_path).await?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at the next stage boundary");
            on_interrupt.cancel();
        }
    });

    info!(
        sources = collectors.len(),
        db = %db_path.display(),
        "starting discovery"
    );

    let mut pipeline = DiscoveryPipeline::new(collectors, analyzer, storage, pipeline_config)
        .with_cancellation(cancel);
    let reporter = CliProgress::new();
    let result = pipeline.run(&reporter).await;
    reporter.clear();
    let report = result.map_err(|e| eyre!("discovery run failed ({}): {e}", pipeline.state()))?;

    let report_dir = expand_home(&config.defaults.report_dir);
    let path = write_report(&report_dir, &report)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &path);
    }

    Ok(())
}

fn build_collectors(config: &AppConfig, seeds: &[PathBuf]) -> Vec<Arc<dyn Collector>> {
    let mut collectors: Vec<Arc<dyn Collector>> = config
        .sources
        .iter()
        .map(|source| {
            Arc::new(SeedFileCollector::new(&source.name, expand_home(&source.path)))
                as Arc<dyn Collector>
        })
        .collect();

    for path in seeds {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "seed".to_string());
        collectors.push(Arc::new(SeedFileCollector::new(name, path.clone())));
    }

    collectors
}

/// `<dir>/discovery_report_<YYYYmmdd_HHMM>.json`
fn report_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    dir.join(format!("discovery_report_{}.json", at.format("%Y%m%d_%H%M")))
}

fn write_report(dir: &Path, report: &DiscoveryReport) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| eyre!("cannot create {}: {e}", dir.display()))?;
    let path = report_path(dir, report.date);
    std::fs::write(&path, serde_json::to_string_pretty(report)?)
        .map_err(|e| eyre!("cannot write {}: {e}", path.display()))?;
    info!(path = %path.display(), "report written");
    Ok(path)
}

fn print_summary(report: &DiscoveryReport, path: &Path) {
    let stats = &report.statistics;
    println!();
    println!("  Discovery complete in {:.1}s", report.runtime_seconds);
    println!("  Discovered:     {}", stats.companies_discovered);
    println!("  Unique:         {}", stats.unique_companies);
    println!("  Analyzed:       {}", stats.companies_analyzed);
    println!("  High-potential: {}", stats.high_potential_targets);
    println!("  AI-washing:     {}", stats.ai_washing_filtered);
    if stats.analysis_failures > 0 {
        println!("  Failed:         {}", stats.analysis_failures);
    }
    if stats.source_failures > 0 {
        println!("  Failed sources: {}", stats.source_failures);
    }
    println!();
    print_companies(&report.top_targets);
    if !report.recommendations.is_empty() {
        println!();
        for rec in &report.recommendations {
            println!("  * {rec}");
        }
    }
    println!();
    println!("  Report: {}", path.display());
    println!();
}

fn print_companies(companies: &[StoredCompany]) {
    if companies.is_empty() {
        println!("  (no companies)");
        return;
    }
    println!(
        "  {:>3}  {:<28} {:>3} {:>4} {:>3}  {}",
        "#", "Name", "AI", "Fit", "HC", "Location"
    );
    for (i, stored) in companies.iter().enumerate() {
        let c = &stored.company;
        println!(
            "  {:>3}  {:<28} {:>3} {:>4} {:>3}  {}",
            i + 1,
            truncate(&c.name, 28),
            score(c.analysis.ai_washing_score),
            score(c.analysis.strategic_fit_score),
            if c.analysis.healthcare_relevance { "y" } else { "" },
            c.location.as_deref().unwrap_or("-"),
        );
    }
}

fn score(value: Option<u8>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn clear(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_collected(&self, source: &str, count: Option<usize>) {
        match count {
            Some(n) => self.spinner.println(format!("  {source}: {n} companies")),
            None => self.spinner.println(format!("  {source}: unavailable")),
        }
    }

    fn company_analyzed(&self, record: &CompanyRecord, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Analyzing [{current}/{total}] {}", record.name));
    }

    fn done(&self, _report: &DiscoveryReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

async fn open_existing(config_path: Option<&Path>) -> Result<Storage> {
    let config = load(config_path)?;
    let storage = Storage::open_readonly(&expand_home(&config.defaults.db_path)).await?;
    Ok(storage)
}

async fn cmd_top(
    config_path: Option<&Path>,
    limit: u32,
    filter: &CompanyFilter,
    json: bool,
) -> Result<()> {
    let storage = open_existing(config_path).await?;
    let companies = storage.top_companies(limit, filter).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&companies)?);
    } else {
        print_companies(&companies);
    }
    Ok(())
}

async fn cmd_search(config_path: Option<&Path>, query: &str, limit: u32, json: bool) -> Result<()> {
    if query.trim().is_empty() {
        return Err(eyre!("search query must not be empty"));
    }
    let storage = open_existing(config_path).await?;
    let companies = storage.search_companies(query, limit).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&companies)?);
    } else {
        print_companies(&companies);
    }
    Ok(())
}

async fn cmd_stats(config_path: Option<&Path>, days: u32) -> Result<()> {
    let storage = open_existing(config_path).await?;
    let companies = storage.company_count().await?;
    let history = storage.run_history(days).await?;

    println!();
    println!("  Companies stored: {companies}");
    println!("  Runs (last {days} days): {} ({} successful)", history.total_runs, history.successful_runs);
    if history.total_runs > 0 {
        println!("  Avg discovered:   {:.1}", history.avg_discovered);
        println!("  Avg analyzed:     {:.1}", history.avg_analyzed);
        println!("  Avg targets:      {:.1}", history.avg_targets);
        println!("  Avg runtime:      {:.1}s", history.avg_runtime_seconds);
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init(config_path: Option<&Path>) -> Result<()> {
    let path = match config_path {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, toml::to_string_pretty(&AppConfig::default())?)?;
            path.to_path_buf()
        }
        None => init_config()?,
    };
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = load(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
