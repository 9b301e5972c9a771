#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use stargazer_insights::browser::PageRenderer;
use stargazer_insights::config::Config;
use stargazer_insights::error::{InsightError, Result};
use stargazer_insights::github::GitHubClient;
use stargazer_insights::llm::LanguageModel;
use stargazer_insights::rate_limiter::RateLimiter;
use stargazer_insights::utils::RetryPolicy;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub mod test_helpers {
    use super::*;

    pub fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_secs: 1,
        }
    }

    /// Configuration pointing at a mock GitHub server and a scratch output directory
    pub fn create_test_config(github_url: &str, output: &Path) -> Config {
        let mut config = Config::default();
        config.repo_url = Some("https://github.com/octo/widgets".into());
        config.endpoints.github_api = github_url.to_string();
        config.retry = fast_retry();
        config.rate_limits.github_requests = 1000;
        config.output.results_dir = output.join("results");
        config.output.images_dir = output.join("images");
        config
    }

    pub fn github_client(url: &str) -> GitHubClient {
        GitHubClient::with_base_url(
            url,
            Some("test-token".into()),
            RateLimiter::new("GitHub", 1000, Duration::from_secs(60)),
            fast_retry(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    pub fn stargazers_json(logins: &[String]) -> String {
        let items: Vec<Value> = logins.iter().map(|l| json!({ "login": l })).collect();
        Value::Array(items).to_string()
    }

    pub fn user_json(login: &str, id: u64) -> String {
        json!({
            "login": login,
            "id": id,
            "name": format!("{} Example", login),
            "email": null,
            "location": "Atlanta",
            "bio": "Databases and search",
            "company": "@example",
            "blog": "",
            "html_url": format!("https://github.com/{}", login),
            "twitter_username": login,
            "followers": 42,
            "following": 7
        })
        .to_string()
    }

    pub fn repo_json(name: &str, stars: u64, fork: bool) -> Value {
        json!({
            "name": name,
            "description": format!("{} description", name),
            "html_url": format!("https://github.com/someone/{}", name),
            "language": "Rust",
            "stargazers_count": stars,
            "fork": fork
        })
    }

    pub fn rate_limit_json() -> String {
        json!({ "resources": { "core": { "limit": 5000, "remaining": 4999 } } }).to_string()
    }
}

/// Renders canned profile pages; listed usernames fail like a crashed session
pub struct StubRenderer {
    pub failing: Vec<String>,
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        let username = url.rsplit('/').next().unwrap_or_default();
        if self.failing.iter().any(|f| f == username) {
            return Err(InsightError::Browser(format!("session for {} crashed", username)));
        }
        Ok(format!(
            r#"<html><body>
                <div class="h-card"><h1>{user}</h1><div>Achievements</div></div>
                <div class="js-yearly-contributions"><h2>12 contributions in the last year</h2></div>
            </body></html>"#,
            user = username
        ))
    }
}

/// Extraction model answering from the scraped text alone
pub struct StubExtractor {
    pub calls: AtomicUsize,
}

impl StubExtractor {
    pub fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl LanguageModel for StubExtractor {
    fn name(&self) -> &str {
        "stub-extractor"
    }

    async fn complete(&self, _instructions: &str, input: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if input.starts_with("Error extracting text") {
            return Ok("name: N/A\ntopics_of_interest: N/A".into());
        }
        let login = input.split_whitespace().next().unwrap_or("N/A");
        Ok(format!(
            "name: {}\ncountry: United States\ncity: Atlanta\nemail: N/A\noccupation: Engineer\n\
             programming_languages: Python\ntopics_of_interest: Postgres, React\n\
             social_media: https://github.com/{}",
            login, login
        ))
    }
}

/// Categorization model; with `drop_last` it loses one row of every batch
pub struct StubCategorizer {
    pub drop_last: bool,
    pub answers: HashMap<String, String>,
}

impl StubCategorizer {
    pub fn new(drop_last: bool) -> Self {
        Self {
            drop_last,
            answers: HashMap::new(),
        }
    }
}

#[async_trait]
impl LanguageModel for StubCategorizer {
    fn name(&self) -> &str {
        "stub-categorizer"
    }

    async fn complete(&self, _instructions: &str, input: &str) -> Result<String> {
        let mut rows: Vec<String> = input
            .split("\n\n")
            .map(|row| match self.answers.get(row) {
                Some(answer) => answer.clone(),
                None if row == "N/A" => "N/A".to_string(),
                None => "[Databases, Web development]".to_string(),
            })
            .collect();
        if self.drop_last {
            rows.pop();
        }
        Ok(rows.join("\n\n"))
    }
}
