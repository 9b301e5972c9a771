use crate::browser::{PageRenderer, WebDriverRenderer};
use crate::cache::{Stage, StageCache};
use crate::charts::{self, ChartPaths};
use crate::config::{Config, RepoTarget};
use crate::error::Result;
use crate::export::{categorized_csv_path, extracted_csv_path, write_records};
use crate::github::GitHubClient;
use crate::llm::{LanguageModel, OpenAIChat};
use crate::models::{CategorizedInsight, InsightRecord, ProfileLookup, ScrapedText, StargazerRecord};
use crate::processors::{categorize_insights, extract_insights, fetch_profile_details, list_stargazers, scrape_profiles};
use crate::ui::ProgressManager;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

/// Row counts and output files of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Stargazers listed
    pub stargazers: usize,
    /// Profiles whose details were fetched
    pub details_found: usize,
    /// Profiles whose detail lookup failed
    pub details_failed: usize,
    /// Profile pages scraped
    pub scraped: usize,
    /// Rows in the categorized export
    pub insights: usize,
    /// Extracted rows CSV
    pub extracted_csv: PathBuf,
    /// Categorized rows CSV
    pub categorized_csv: PathBuf,
}

/// The external services a run talks to
pub struct Components {
    /// GitHub REST client
    pub github: GitHubClient,
    /// Profile page renderer
    pub renderer: Arc<dyn PageRenderer>,
    /// Model used for field extraction
    pub extractor: Arc<dyn LanguageModel>,
    /// Model used for categorization
    pub categorizer: Arc<dyn LanguageModel>,
}

impl Components {
    /// Real clients built from the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.openai_api_key()?;
        let api_base = &config.endpoints.openai_api;
        let temperature = config.models.temperature;

        Ok(Self {
            github: GitHubClient::new(config)?,
            renderer: Arc::new(WebDriverRenderer::new(&config.endpoints.webdriver)),
            extractor: Arc::new(OpenAIChat::new(api_key, api_base, &config.models.extraction, temperature)),
            categorizer: Arc::new(OpenAIChat::new(api_key, api_base, &config.models.categorization, temperature)),
        })
    }
}

/// Runs the stages in order, reusing stage snapshots, and exports the results
pub struct Pipeline {
    config: Config,
    repo: RepoTarget,
    components: Components,
    cache: StageCache,
    progress: ProgressManager,
}

impl Pipeline {
    /// Validates the configuration and connects the real services
    pub fn new(config: Config, fresh: bool) -> Result<Self> {
        config.validate()?;
        let components = Components::from_config(&config)?;
        Self::with_components(config, components, fresh, ProgressManager::new())
    }

    /// Builds a pipeline around the given services
    pub fn with_components(
        config: Config,
        components: Components,
        fresh: bool,
        progress: ProgressManager,
    ) -> Result<Self> {
        config.validate()?;
        let repo = config.repository()?;
        let cache = StageCache::new(&config.output.results_dir, &repo.name, fresh);

        Ok(Self {
            config,
            repo,
            components,
            cache,
            progress,
        })
    }

    /// Runs every stage, reusing snapshots, and writes both CSV files
    pub async fn run(&self) -> Result<RunSummary> {
        info!("Analysing stargazers of {}", self.repo);
        self.config.ensure_directories_exist().await?;
        self.components.github.check_rate_limit().await;

        let processing = &self.config.processing;
        let github = &self.components.github;

        let spinner = self
            .progress
            .create_spinner(&format!("Listing stargazers of {}", self.repo.full_name()));
        let stargazers: Vec<StargazerRecord> = self
            .cache
            .get_or_compute(Stage::StargazerList, || {
                list_stargazers(github, &self.repo, processing.stargazer_cap)
            })
            .await?;
        spinner.finish_and_clear();

        let details: Vec<ProfileLookup> = self
            .cache
            .get_or_compute(Stage::StargazerDetails, || {
                fetch_profile_details(
                    github,
                    &stargazers,
                    processing.detail_limit,
                    processing.fetch_workers,
                    self.config.filters,
                )
            })
            .await?;

        let scraped: Vec<ScrapedText> = self
            .cache
            .get_or_compute(Stage::StargazerScrapedDetails, || async {
                Ok(scrape_profiles(
                    self.components.renderer.clone(),
                    &self.config.endpoints.profile_base,
                    &stargazers,
                    processing.scrape_workers,
                    &self.progress,
                )
                .await)
            })
            .await?;

        let insights: Vec<InsightRecord> = self
            .cache
            .get_or_compute(Stage::StargazerInsights, || {
                extract_insights(
                    self.components.extractor.clone(),
                    &scraped,
                    processing.llm_workers,
                    &self.progress,
                )
            })
            .await?;

        let spinner = self.progress.create_spinner("Categorizing interests");
        let categorized: Vec<CategorizedInsight> = self
            .cache
            .get_or_compute(Stage::StargazerInsightsCategorized, || {
                categorize_insights(
                    self.components.categorizer.as_ref(),
                    insights.clone(),
                    processing.categorize_batch_size,
                )
            })
            .await?;
        spinner.finish_and_clear();

        let results_dir = &self.config.output.results_dir;
        let extracted_csv = extracted_csv_path(results_dir, &self.repo.name);
        let categorized_csv = categorized_csv_path(results_dir, &self.repo.name);
        write_records(&extracted_csv, &insights)?;
        write_records(&categorized_csv, &categorized)?;

        let details_found = details.iter().filter(|d| d.detail().is_some()).count();
        let summary = RunSummary {
            stargazers: stargazers.len(),
            details_found,
            details_failed: details.len() - details_found,
            scraped: scraped.len(),
            insights: categorized.len(),
            extracted_csv,
            categorized_csv,
        };
        info!("Run finished: {:?}", summary);
        Ok(summary)
    }
}

/// Renders the charts from the exported CSV files of `config`'s repository
pub fn visualize(config: &Config) -> Result<ChartPaths> {
    let repo = config.repository()?;
    charts::visualize(&config.output.results_dir, &config.output.images_dir, &repo.name)
}
