//! Application configuration for startupintel.
//!
//! User config lives at `~/.startupintel/startupintel.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StartupIntelError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "startupintel.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".startupintel";

// ---------------------------------------------------------------------------
// Config structs (matching startupintel.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Outbound request policy.
    #[serde(default)]
    pub scraping: ScrapingConfig,

    /// GitHub API settings.
    #[serde(default)]
    pub github: GitHubConfig,

    /// Target company profile for fit scoring.
    #[serde(default)]
    pub targets: TargetCriteria,

    /// Seed-file collectors.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Directory discovery reports are written to.
    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    /// Number of ranked companies included in a report.
    #[serde(default = "default_top_n")]
    pub top_n: u32,

    /// Collectors run at the same time.
    #[serde(default = "default_collector_concurrency")]
    pub collector_concurrency: u32,

    /// Companies analyzed at the same time. 1 keeps analysis sequential.
    #[serde(default = "default_analysis_concurrency")]
    pub analysis_concurrency: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            report_dir: default_report_dir(),
            top_n: default_top_n(),
            collector_concurrency: default_collector_concurrency(),
            analysis_concurrency: default_analysis_concurrency(),
        }
    }
}

fn default_db_path() -> String {
    "~/.startupintel/startupintel.db".into()
}
fn default_report_dir() -> String {
    "data/outputs".into()
}
fn default_top_n() -> u32 {
    10
}
fn default_collector_concurrency() -> u32 {
    4
}
fn default_analysis_concurrency() -> u32 {
    1
}

/// `[scraping]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapingConfig {
    /// Delay before each outbound request, in milliseconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Blog pages scored per company.
    #[serde(default = "default_max_blog_posts")]
    pub max_blog_posts: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: default_request_delay(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            max_blog_posts: default_max_blog_posts(),
        }
    }
}

fn default_request_delay() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("startupintel/", env!("CARGO_PKG_VERSION")).into()
}
fn default_max_blog_posts() -> usize {
    3
}

/// `[github]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Name of the env var holding the API token (never store the token itself).
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Upper bound on repositories fetched per organization.
    #[serde(default = "default_max_repos")]
    pub max_repos: usize,

    /// Refuse to start a run without a token.
    #[serde(default = "default_true")]
    pub require_token: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token_env: default_token_env(),
            api_base: default_api_base(),
            max_repos: default_max_repos(),
            require_token: true,
        }
    }
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_max_repos() -> usize {
    500
}
fn default_true() -> bool {
    true
}

/// `[targets]` section — the profile companies are scored against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetCriteria {
    #[serde(default = "default_target_locations")]
    pub target_locations: Vec<String>,

    /// Matched exactly against a record's funding stage.
    #[serde(default = "default_funding_stages")]
    pub funding_stages: Vec<String>,

    #[serde(default = "default_min_employees")]
    pub min_employees: u32,

    #[serde(default = "default_max_employees")]
    pub max_employees: u32,

    #[serde(default = "default_target_industries")]
    pub target_industries: Vec<String>,

    /// Companies below this AI-washing score count as filtered.
    #[serde(default = "default_min_ai_washing_score")]
    pub min_ai_washing_score: u8,

    /// Fit score at or above which a company is a high-potential target.
    #[serde(default = "default_high_potential_fit_score")]
    pub high_potential_fit_score: u8,
}

impl Default for TargetCriteria {
    fn default() -> Self {
        Self {
            target_locations: default_target_locations(),
            funding_stages: default_funding_stages(),
            min_employees: default_min_employees(),
            max_employees: default_max_employees(),
            target_industries: default_target_industries(),
            min_ai_washing_score: default_min_ai_washing_score(),
            high_potential_fit_score: default_high_potential_fit_score(),
        }
    }
}

fn default_target_locations() -> Vec<String> {
    ["Seattle", "Bellevue", "Redmond", "Kirkland"]
        .map(String::from)
        .to_vec()
}
fn default_funding_stages() -> Vec<String> {
    ["Series A", "Series B", "Early Stage VC"]
        .map(String::from)
        .to_vec()
}
fn default_min_employees() -> u32 {
    10
}
fn default_max_employees() -> u32 {
    200
}
fn default_target_industries() -> Vec<String> {
    [
        "Healthcare",
        "Health Tech",
        "Medical Devices",
        "E-commerce",
        "Enterprise Software",
        "SaaS",
        "Real-time Communications",
        "Video Conferencing",
        "AI/ML Infrastructure",
        "Data Analytics",
    ]
    .map(String::from)
    .to_vec()
}
fn default_min_ai_washing_score() -> u8 {
    6
}
fn default_high_potential_fit_score() -> u8 {
    7
}

/// `[[sources]]` entry — a seed file of company records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Source tag stamped onto every record from this file.
    pub name: String,
    /// Path to a JSON array of company records.
    pub path: String,
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub top_n: u32,
    pub collector_concurrency: usize,
    pub analysis_concurrency: usize,
    pub min_ai_washing_score: u8,
    pub high_potential_fit_score: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            top_n: config.defaults.top_n,
            collector_concurrency: config.defaults.collector_concurrency as usize,
            analysis_concurrency: config.defaults.analysis_concurrency as usize,
            min_ai_washing_score: config.targets.min_ai_washing_score,
            high_potential_fit_score: config.targets.high_potential_fit_score,
        }
    }
}

impl PipelineConfig {
    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.collector_concurrency == 0 || self.analysis_concurrency == 0 {
            return Err(StartupIntelError::config("concurrency must be at least 1"));
        }
        if self.top_n == 0 {
            return Err(StartupIntelError::config("top_n must be at least 1"));
        }
        if !(1..=10).contains(&self.min_ai_washing_score) {
            return Err(StartupIntelError::config(format!(
                "min_ai_washing_score must be within 1..=10, got {}",
                self.min_ai_washing_score
            )));
        }
        Ok(())
    }
}

impl TargetCriteria {
    /// Reject an inverted employee range.
    pub fn validate(&self) -> Result<()> {
        if self.min_employees > self.max_employees {
            return Err(StartupIntelError::config(format!(
                "min_employees ({}) exceeds max_employees ({})",
                self.min_employees, self.max_employees
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.startupintel/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| StartupIntelError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.startupintel/startupintel.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| StartupIntelError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        StartupIntelError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| StartupIntelError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| StartupIntelError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| StartupIntelError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Read the GitHub token from the configured env var, if set and non-empty.
pub fn github_token(config: &AppConfig) -> Option<String> {
    std::env::var(&config.github.token_env)
        .ok()
        .filter(|v| !v.is_empty())
}

/// Check that required credentials are present before a run starts.
pub fn validate_credentials(config: &AppConfig) -> Result<()> {
    if config.github.require_token && github_token(config).is_none() {
        let var_name = &config.github.token_env;
        return Err(StartupIntelError::config(format!(
            "GitHub token required for API access. Set the {var_name} environment variable."
        )));
    }
    Ok(())
}
