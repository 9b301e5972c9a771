use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, sleep_until, Instant};
use log::{debug, info};

/// Sliding-window limiter shared by every worker talking to one API
///
/// Besides the window budget, a worker that hits a server-side rate limit can
/// pause the limiter so the other workers hold off too.
#[derive(Clone)]
pub struct RateLimiter {
    name: String,
    limit: RateLimit,
    state: Arc<Mutex<RateLimitState>>,
}

#[derive(Clone, Copy)]
struct RateLimit {
    requests: usize,
    window: Duration,
}

#[derive(Default)]
struct RateLimitState {
    requests: VecDeque<Instant>,
    paused_until: Option<Instant>,
}

impl RateLimiter {
    /// Allows `requests` calls per `window` for the API called `name`
    pub fn new(name: &str, requests: usize, window: Duration) -> Self {
        Self {
            name: name.to_string(),
            limit: RateLimit {
                requests: requests.max(1),
                window,
            },
            state: Arc::new(Mutex::new(RateLimitState::default())),
        }
    }

    /// Waits until a request may be sent and records it
    pub async fn acquire(&self) {
        loop {
            let mut state = self.state.lock().await;
            let now = Instant::now();

            if let Some(until) = state.paused_until {
                if until > now {
                    drop(state);
                    debug!("{} limiter paused, waiting {:?}", self.name, until - now);
                    sleep_until(until).await;
                    continue;
                }
                state.paused_until = None;
            }

            while let Some(&oldest) = state.requests.front() {
                if now.duration_since(oldest) >= self.limit.window {
                    state.requests.pop_front();
                } else {
                    break;
                }
            }

            if state.requests.len() < self.limit.requests {
                state.requests.push_back(now);
                return;
            }

            let wait = state
                .requests
                .front()
                .map(|&oldest| self.limit.window.saturating_sub(now.duration_since(oldest)))
                .unwrap_or_default()
                .max(Duration::from_millis(10));
            drop(state);
            sleep(wait).await;
        }
    }

    /// Holds every caller back for `delay`, e.g. after a 429 from the server
    pub async fn pause_for(&self, delay: Duration) {
        let until = Instant::now() + delay;
        let mut state = self.state.lock().await;
        if state.paused_until.map_or(true, |current| current < until) {
            info!("{} rate limited, pausing requests for {:?}", self.name, delay);
            state.paused_until = Some(until);
        }
    }
}
