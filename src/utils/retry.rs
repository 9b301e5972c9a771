use crate::error::{ErrorClass, InsightError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Duration};

/// Retry behaviour driven by [`ErrorClass`]
///
/// Transient failures back off exponentially, rate limits wait for the
/// announced delay, and not-found or fatal errors are returned at once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds
    pub base_delay_ms: u64,
    /// Upper bound for any single wait, in seconds
    pub max_delay_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_ms: 1000,
            max_delay_secs: 300,
        }
    }
}

impl RetryPolicy {
    /// Exponential delay after the given failed attempt (1-based), capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        let delay = Duration::from_millis(self.base_delay_ms.saturating_mul(factor));
        delay.min(self.max_delay())
    }

    /// How long to wait before retrying, or `None` when the error must not be retried
    pub fn delay_for(&self, class: ErrorClass, attempt: u32) -> Option<Duration> {
        match class {
            ErrorClass::Transient => Some(self.backoff(attempt)),
            ErrorClass::RateLimited { retry_after: Some(wait) } => Some(wait.min(self.max_delay())),
            ErrorClass::RateLimited { retry_after: None } => Some(self.backoff(attempt)),
            ErrorClass::NotFound | ErrorClass::Fatal => None,
        }
    }

    fn max_delay(&self) -> Duration {
        Duration::from_secs(self.max_delay_secs)
    }
}

/// Runs `f` until it succeeds, the error is not retryable, or attempts run out
pub async fn with_retry<F, Fut, T>(
    policy: &RetryPolicy,
    what: &str,
    f: F,
) -> Result<T, InsightError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, InsightError>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                attempts += 1;
                if attempts >= policy.max_attempts {
                    warn!("{} failed after {} attempts: {}", what, attempts, e);
                    return Err(e);
                }
                let Some(delay) = policy.delay_for(e.class(), attempts) else {
                    debug!("{} failed without retry: {}", what, e);
                    return Err(e);
                };
                warn!("{} failed ({}), retrying in {:?}", what, e, delay);
                sleep(delay).await;
            }
        }
    }
}
