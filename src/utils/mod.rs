/// Classified retries with backoff
pub mod retry;

pub use retry::{with_retry, RetryPolicy};
