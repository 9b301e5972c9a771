#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! stargazer-insights - who starred a GitHub repository, and what are they into?
//!
//! The pipeline lists a repository's stargazers, fetches their account details,
//! scrapes the visible text of their profile pages with a headless browser,
//! has a language model extract structured attributes from that text and
//! categorize their interests, then exports CSV files and renders charts.
//!
//! ## Stages
//! - List stargazers through the GitHub REST API
//! - Fetch profile details with filtered owned and starred repositories
//! - Scrape profile page regions through WebDriver
//! - Extract 8 fixed attributes per profile with a small model
//! - Categorize interests into technical areas with a large model, in batches
//!
//! Every stage output is snapshotted as JSON and reused on the next run.
//!
//! ## Usage
//! ```rust,ignore
//! use stargazer_insights::{Config, orchestrator::Pipeline};
//!
//! async fn example() -> stargazer_insights::Result<()> {
//!     let config = Config::load(None)?;
//!     let summary = Pipeline::new(config, false)?.run().await?;
//!     println!("{} rows in {}", summary.insights, summary.categorized_csv.display());
//!     Ok(())
//! }
//! ```

/// Headless browser rendering of profile pages
pub mod browser;
/// Stage snapshots reused between runs
pub mod cache;
/// Word cloud and pie chart rendering
pub mod charts;
/// Configuration module for the application
pub mod config;
/// Error handling types and utilities
pub mod error;
/// CSV export and reload
pub mod export;
/// GitHub REST API client
pub mod github;
/// Language model access
pub mod llm;
/// Logging configuration and utilities
pub mod logging;
/// Records exchanged between stages
pub mod models;
/// Stage sequencing and result export
pub mod orchestrator;
/// Parallel processing utilities
pub mod parallel;
/// Parsing of `key: value` model answers
pub mod parser;
/// The pipeline stages
pub mod processors;
/// Prompt texts sent to the language models
pub mod prompts;
/// Rate limiting functionality to respect API limits
pub mod rate_limiter;
/// Progress bars and status lines
pub mod ui;
/// Utilities (retry helpers)
pub mod utils;

// Re-export common types
pub use config::Config;
pub use error::{InsightError, Result};
pub use models::{CategorizedInsight, InsightRecord, ProfileDetail, ScrapedText, StargazerRecord};
pub use orchestrator::{Pipeline, RunSummary};
