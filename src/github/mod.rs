//! Thin GitHub REST client covering the stargazer, user and repository endpoints.
//!
//! Every request passes through the shared [`RateLimiter`] and the classified
//! [`RetryPolicy`]; HTTP failures are turned into typed errors here so the
//! stages can decide between retrying, skipping a row and aborting.

use crate::config::{Config, RepoTarget};
use crate::error::{InsightError, Result};
use crate::rate_limiter::RateLimiter;
use crate::utils::retry::{with_retry, RetryPolicy};
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// GitHub never returns more than this many items per page
pub const MAX_PER_PAGE: usize = 100;

const CLIENT_USER_AGENT: &str = concat!("stargazer-insights/", env!("CARGO_PKG_VERSION"));

/// Account fields returned by `GET /users/{login}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    /// Account login
    pub login: String,
    /// Numeric account id
    pub id: u64,
    /// Display name
    pub name: Option<String>,
    /// Public email
    pub email: Option<String>,
    /// Free-form location
    pub location: Option<String>,
    /// Profile bio
    pub bio: Option<String>,
    /// Company
    pub company: Option<String>,
    /// Website, often empty
    pub blog: Option<String>,
    /// Profile page URL
    pub html_url: String,
    /// Twitter handle
    pub twitter_username: Option<String>,
    /// Follower count
    #[serde(default)]
    pub followers: u64,
    /// Following count
    #[serde(default)]
    pub following: u64,
}

/// Repository fields used for the owned and starred lists
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    /// Repository name
    pub name: String,
    /// Repository description
    pub description: Option<String>,
    /// Repository page URL
    pub html_url: String,
    /// Primary language
    pub language: Option<String>,
    /// Star count
    #[serde(default)]
    pub stargazers_count: u64,
    /// Whether the repository is a fork
    #[serde(default)]
    pub fork: bool,
}

#[derive(Debug, Deserialize)]
struct Stargazer {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitStatus {
    resources: RateLimitResources,
}

#[derive(Debug, Deserialize)]
struct RateLimitResources {
    core: RateLimitWindow,
}

#[derive(Debug, Deserialize)]
struct RateLimitWindow {
    limit: u64,
    remaining: u64,
}

/// GitHub API client shared by the listing and detail stages
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    limiter: RateLimiter,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Builds a client from the run configuration
    pub fn new(config: &Config) -> Result<Self> {
        let limiter = RateLimiter::new(
            "GitHub",
            config.rate_limits.github_requests,
            Duration::from_secs(config.rate_limits.github_window_secs),
        );
        Self::with_base_url(
            &config.endpoints.github_api,
            config.api_keys.github_token.clone(),
            limiter,
            config.retry.clone(),
            config.http_timeout(),
        )
    }

    /// Builds a client against an explicit API base, e.g. a mock server
    pub fn with_base_url(
        base_url: &str,
        token: Option<String>,
        limiter: RateLimiter,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InsightError::Network(e.to_string()))?;

        if token.is_none() {
            warn!("No GitHub token configured, running unauthenticated with lower rate limits");
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            limiter,
            retry,
        })
    }

    /// Logs the remaining core quota; failures here are only reported
    pub async fn check_rate_limit(&self) {
        match self.get_json::<RateLimitStatus>("/rate_limit", &[]).await {
            Ok(status) => {
                let core = status.resources.core;
                info!("GitHub quota: {}/{} requests remaining", core.remaining, core.limit);
                if core.remaining < 10 {
                    warn!("GitHub API rate limit is low: {} requests remaining", core.remaining);
                }
            }
            Err(e) => warn!("Could not read GitHub rate limit: {}", e),
        }
    }

    /// Lists up to `cap` stargazer logins in API order
    pub async fn list_stargazers(&self, repo: &RepoTarget, cap: usize) -> Result<Vec<String>> {
        let path = format!("/repos/{}/stargazers", repo.full_name());
        let mut logins = Vec::new();
        let mut page = 1;

        while logins.len() < cap {
            let remaining = cap - logins.len();
            // Fixed page size keeps page numbers aligned; the last page is cut client-side.
            let batch: Vec<Stargazer> = self
                .get_json(&path, &[("per_page", MAX_PER_PAGE.to_string()), ("page", page.to_string())])
                .await?;
            let short_page = batch.len() < MAX_PER_PAGE;

            logins.extend(batch.into_iter().take(remaining).map(|s| s.login));
            debug!("stargazers page {}: {} logins so far", page, logins.len());

            if short_page {
                break;
            }
            page += 1;
        }

        Ok(logins)
    }

    /// Fetches the account fields of one user
    pub async fn get_user(&self, login: &str) -> Result<GitHubUser> {
        self.get_json(&format!("/users/{}", login), &[]).await
    }

    /// Lists every public repository owned by `login`
    pub async fn list_user_repos(&self, login: &str) -> Result<Vec<GitHubRepo>> {
        let path = format!("/users/{}/repos", login);
        let mut repos = Vec::new();
        let mut page = 1;

        loop {
            let batch: Vec<GitHubRepo> = self
                .get_json(&path, &[("per_page", MAX_PER_PAGE.to_string()), ("page", page.to_string())])
                .await?;
            let short_page = batch.len() < MAX_PER_PAGE;
            repos.extend(batch);
            if short_page {
                return Ok(repos);
            }
            page += 1;
        }
    }

    /// Lists the first `limit` repositories starred by `login`
    pub async fn list_starred(&self, login: &str, limit: usize) -> Result<Vec<GitHubRepo>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let per_page = limit.min(MAX_PER_PAGE);
        let mut repos: Vec<GitHubRepo> = self
            .get_json(
                &format!("/users/{}/starred", login),
                &[("per_page", per_page.to_string()), ("page", "1".to_string())],
            )
            .await?;
        repos.truncate(limit);
        Ok(repos)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let this = self;
        let what = format!("GET {}", path);
        with_retry(&self.retry, &what, move || async move {
            this.limiter.acquire().await;
            let result = this.request_once(path, query).await;
            if let Err(InsightError::RateLimitExceeded { retry_after: Some(delay), .. }) = &result {
                this.limiter.pause_for(*delay).await;
            }
            result
        })
        .await
    }

    async fn request_once<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let mut request = self
            .client
            .get(&url)
            .query(query)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        let response = request
            .send()
            .await
            .map_err(|e| InsightError::Network(format!("{}: {}", path, e)))?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(InsightError::Http);
        }

        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Err(classify_response(path, status, &headers, &body))
    }
}

/// Turns a failed GitHub response into the error the retry policy understands
pub fn classify_response(path: &str, status: StatusCode, headers: &HeaderMap, body: &str) -> InsightError {
    let message = extract_message(body).unwrap_or_else(|| status.to_string());

    let quota_exhausted = header_u64(headers, "x-ratelimit-remaining") == Some(0);
    let mentions_limit = message.to_lowercase().contains("rate limit");

    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && (quota_exhausted || mentions_limit))
    {
        return InsightError::RateLimitExceeded {
            message: format!("{}: {}", path, message),
            retry_after: retry_after(headers),
        };
    }

    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => InsightError::NotFound(format!("{}: {}", path, message)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            InsightError::Unauthorized(format!("{}: {}", path, message))
        }
        _ => InsightError::GitHubApi {
            status: status.as_u16(),
            message: format!("{}: {}", path, message),
        },
    }
}

/// Delay announced by `retry-after`, or derived from `x-ratelimit-reset`
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    if let Some(secs) = header_u64(headers, "retry-after") {
        return Some(Duration::from_secs(secs));
    }
    let reset = header_u64(headers, "x-ratelimit-reset")?;
    let now = chrono::Utc::now().timestamp().max(0) as u64;
    Some(Duration::from_secs(reset.saturating_sub(now).max(1)))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}
