mod env_manager;

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::error::{InsightError, Result};
use url::Url;
use crate::utils::retry::RetryPolicy;
use log::warn;
use std::fs;

pub use env_manager::{get_env_value, ApiKeys};

/// Main configuration for a pipeline run
///
/// Everything except the secrets can come from a TOML file; environment
/// variables override the file, and secrets only ever come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Repository whose stargazers are analysed, `https://github.com/owner/repo` or `owner/repo`
    pub repo_url: Option<String>,
    /// Credentials, never serialized
    #[serde(skip)]
    pub api_keys: ApiKeys,
    /// Stage sizes and worker counts
    pub processing: ProcessingConfig,
    /// Star thresholds for the owned and starred repository lists
    pub filters: RepoFilter,
    /// Retry behaviour for GitHub calls
    pub retry: RetryPolicy,
    /// Request budget for GitHub calls
    pub rate_limits: RateLimits,
    /// Service locations
    pub endpoints: Endpoints,
    /// Model names for the two LLM stages
    pub models: ModelConfig,
    /// Output locations
    pub output: OutputConfig,
}

/// Sizes and concurrency of the pipeline stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum number of stargazers listed
    pub stargazer_cap: usize,
    /// Number of stargazers whose profile details are fetched
    pub detail_limit: usize,
    /// Concurrent profile detail fetches
    pub fetch_workers: usize,
    /// Concurrent browser sessions
    pub scrape_workers: usize,
    /// Concurrent extraction calls
    pub llm_workers: usize,
    /// Interest strings sent per categorization call
    pub categorize_batch_size: usize,
}

/// Which repositories make it into a profile's owned and starred lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoFilter {
    /// Owned, non-fork repositories need strictly more stars than this
    pub owned_min_stars: u64,
    /// Starred repositories need strictly more stars than this
    pub starred_min_stars: u64,
    /// Only this many starred repositories are looked at
    pub starred_scan_limit: usize,
}

/// Sliding-window request budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimits {
    /// Requests allowed per window
    pub github_requests: usize,
    /// Window length in seconds
    pub github_window_secs: u64,
}

/// Locations of the external services
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// GitHub REST API base
    pub github_api: String,
    /// Base of public profile pages
    pub profile_base: String,
    /// WebDriver server driving the headless browser
    pub webdriver: String,
    /// OpenAI-compatible API base
    pub openai_api: String,
    /// HTTP timeout for GitHub calls, in seconds
    pub http_timeout_secs: u64,
}

/// Model names
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Small, fast model used per row
    pub extraction: String,
    /// Larger model used for batched categorization
    pub categorization: String,
    /// Sampling temperature for both calls
    pub temperature: f32,
}

/// Where results and charts are written
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Stage snapshots and CSV exports
    pub results_dir: PathBuf,
    /// Rendered charts
    pub images_dir: PathBuf,
}

/// Owner and name of the analysed repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoTarget {
    /// Account owning the repository
    pub owner: String,
    /// Repository name, also used to prefix every output file
    pub name: String,
}

impl RepoTarget {
    /// Parses `https://github.com/owner/repo`, `github.com/owner/repo/` or `owner/repo`
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
        let parts: Vec<&str> = trimmed.split('/').filter(|p| !p.is_empty()).collect();

        match parts.as_slice() {
            [.., owner, name] if !owner.ends_with(':') => Ok(Self {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
            _ => Err(InsightError::Config(format!(
                "Repository must look like https://github.com/owner/repo, got '{}'",
                input
            ))),
        }
    }

    /// `owner/name`, as used in API paths
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl Config {
    /// Loads configuration from an optional TOML file, the `.env` file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(problem) = dotenv_problem(dotenvy::dotenv()) {
            warn!("{}", problem);
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parses a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            InsightError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            InsightError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn apply_env(&mut self) {
        if let Some(url) = get_env_value("REPO_URL") {
            self.repo_url = Some(url);
        }
        if let Some(base) = get_env_value("GITHUB_API_BASE_URL") {
            self.endpoints.github_api = base;
        }
        if let Some(base) = get_env_value("GITHUB_PROFILE_BASE_URL") {
            self.endpoints.profile_base = base;
        }
        if let Some(url) = get_env_value("WEBDRIVER_URL") {
            self.endpoints.webdriver = url;
        }
        if let Some(base) = get_env_value("OPENAI_API_BASE") {
            self.endpoints.openai_api = base;
        }
        if let Some(model) = get_env_value("EXTRACTION_MODEL") {
            self.models.extraction = model;
        }
        if let Some(model) = get_env_value("CATEGORIZATION_MODEL") {
            self.models.categorization = model;
        }
        self.api_keys = ApiKeys::from_env();
    }

    /// The analysed repository; fails when it is missing or malformed
    pub fn repository(&self) -> Result<RepoTarget> {
        let url = self.repo_url.as_deref().ok_or_else(|| {
            InsightError::Config("REPO_URL is not set".into())
        })?;
        RepoTarget::parse(url)
    }

    /// Checks everything a run needs before any network call is made
    pub fn validate(&self) -> Result<()> {
        self.repository()?;

        let p = &self.processing;
        let sizes = [
            ("fetch_workers", p.fetch_workers),
            ("scrape_workers", p.scrape_workers),
            ("llm_workers", p.llm_workers),
            ("categorize_batch_size", p.categorize_batch_size),
            ("github_requests", self.rate_limits.github_requests),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, v)| *v == 0) {
            return Err(InsightError::Config(format!("{} must be at least 1", name)));
        }
        if self.retry.max_attempts == 0 {
            return Err(InsightError::Config("retry.max_attempts must be at least 1".into()));
        }

        let e = &self.endpoints;
        for (name, value) in [
            ("github_api", &e.github_api),
            ("profile_base", &e.profile_base),
            ("webdriver", &e.webdriver),
            ("openai_api", &e.openai_api),
        ] {
            Url::parse(value).map_err(|err| {
                InsightError::Config(format!("endpoints.{} is not a valid URL ({}): {}", name, value, err))
            })?;
        }
        Ok(())
    }

    /// The OpenAI key, required by the extraction and categorization stages
    pub fn openai_api_key(&self) -> Result<&str> {
        self.api_keys
            .openai_api_key
            .as_deref()
            .ok_or_else(|| InsightError::Config("OPENAI_API_KEY is not set".into()))
    }

    /// Creates the result and image directories
    pub async fn ensure_directories_exist(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output.results_dir).await?;
        tokio::fs::create_dir_all(&self.output.images_dir).await?;
        Ok(())
    }

    /// Timeout applied to every GitHub request
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoints.http_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            repo_url: None,
            api_keys: ApiKeys::default(),
            processing: ProcessingConfig::default(),
            filters: RepoFilter::default(),
            retry: RetryPolicy::default(),
            rate_limits: RateLimits::default(),
            endpoints: Endpoints::default(),
            models: ModelConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            stargazer_cap: 1000,
            detail_limit: 10,
            fetch_workers: 4,
            scrape_workers: 16,
            llm_workers: 4,
            categorize_batch_size: 10,
        }
    }
}

impl Default for RepoFilter {
    fn default() -> Self {
        Self {
            owned_min_stars: 10,
            starred_min_stars: 100,
            starred_scan_limit: 10,
        }
    }
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            github_requests: 60,
            github_window_secs: 60,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            profile_base: "https://github.com".to_string(),
            webdriver: "http://localhost:4444".to_string(),
            openai_api: "https://api.openai.com/v1".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            extraction: "gpt-3.5-turbo-16k".to_string(),
            categorization: "gpt-4-32k".to_string(),
            temperature: 0.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            images_dir: PathBuf::from("images"),
        }
    }
}

/// Describes a `.env` file that exists but could not be loaded
///
/// A missing file is not a problem; the variables may already be exported.
fn dotenv_problem<T>(outcome: std::result::Result<T, dotenvy::Error>) -> Option<String> {
    match outcome {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("Ignoring .env file: {}", e)),
    }
}
