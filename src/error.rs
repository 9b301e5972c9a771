use std::io;
use std::time::Duration;
use thiserror::Error;
use async_openai::error::OpenAIError;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, InsightError>;

/// How a failure should be handled by the retry policy and the stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The remote side asked us to slow down, optionally saying for how long
    RateLimited {
        /// Delay announced by the server, if any
        retry_after: Option<Duration>,
    },
    /// The resource is missing or not visible with our credentials; skip the row
    NotFound,
    /// Network hiccup or server-side failure; worth a few more attempts
    Transient,
    /// Retrying cannot help
    Fatal,
}

/// Errors that can occur while running the pipeline
#[derive(Debug, Error)]
pub enum InsightError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// OpenAI API errors
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// API rate limit exceeded errors
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Server message or status line
        message: String,
        /// Delay announced through `retry-after` or `x-ratelimit-reset`
        retry_after: Option<Duration>,
    },

    /// Resource does not exist or is hidden from us
    #[error("Not found: {0}")]
    NotFound(String),

    /// Credential rejected
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// GitHub API specific errors
    #[error("GitHub API error ({status}): {message}")]
    GitHubApi {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Network connectivity errors
    #[error("Network error: {0}")]
    Network(String),

    /// Browser automation errors
    #[error("Browser error: {0}")]
    Browser(String),

    /// Language model transport errors
    #[error("LLM error: {0}")]
    LLM(String),

    /// A language model answer that breaks the expected shape
    #[error("LLM contract violation: {0}")]
    Contract(String),

    /// Parsing errors
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Chart rendering errors
    #[error("Chart error: {0}")]
    Chart(String),

    /// General message errors
    #[error("{0}")]
    Message(String),
}

impl InsightError {
    /// Creates a new error with the specified message
    pub fn new(message: &str) -> Self {
        Self::Message(message.to_string())
    }

    /// Maps this error onto the handling class used by the retry policy
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RateLimitExceeded { retry_after, .. } => ErrorClass::RateLimited {
                retry_after: *retry_after,
            },
            Self::NotFound(_) | Self::Unauthorized(_) => ErrorClass::NotFound,
            Self::GitHubApi { status, .. } if *status >= 500 => ErrorClass::Transient,
            Self::Network(_) | Self::IO(_) => ErrorClass::Transient,
            Self::Http(e) => {
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    ErrorClass::Transient
                } else {
                    match e.status() {
                        Some(status) if status.is_server_error() => ErrorClass::Transient,
                        _ => ErrorClass::Fatal,
                    }
                }
            }
            _ => ErrorClass::Fatal,
        }
    }

    /// Checks if this error is transient and retryable
    pub fn is_transient(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Transient | ErrorClass::RateLimited { .. }
        )
    }

    /// Checks if this error is fatal and should terminate processing
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }
}

impl From<fantoccini::error::CmdError> for InsightError {
    fn from(e: fantoccini::error::CmdError) -> Self {
        Self::Browser(e.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for InsightError {
    fn from(e: fantoccini::error::NewSessionError) -> Self {
        Self::Browser(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = InsightError::new("test error");
        assert!(matches!(error, InsightError::Message(_)));

        if let InsightError::Message(msg) = error {
            assert_eq!(msg, "test error");
        }
    }

    #[test]
    fn test_is_transient() {
        let transient = InsightError::Network("connection timeout".into());
        let fatal = InsightError::Contract("9 rows for 10 inputs".into());

        assert!(transient.is_transient());
        assert!(!fatal.is_transient());
        assert!(fatal.is_fatal());
    }

    #[test]
    fn test_classification() {
        let limited = InsightError::RateLimitExceeded {
            message: "API rate limit exceeded".into(),
            retry_after: Some(Duration::from_secs(7)),
        };
        assert_eq!(
            limited.class(),
            ErrorClass::RateLimited { retry_after: Some(Duration::from_secs(7)) }
        );

        assert_eq!(InsightError::NotFound("ghost".into()).class(), ErrorClass::NotFound);
        assert_eq!(InsightError::Unauthorized("bad token".into()).class(), ErrorClass::NotFound);

        let bad_gateway = InsightError::GitHubApi { status: 502, message: "Bad Gateway".into() };
        assert_eq!(bad_gateway.class(), ErrorClass::Transient);

        let unprocessable = InsightError::GitHubApi { status: 422, message: "nope".into() };
        assert_eq!(unprocessable.class(), ErrorClass::Fatal);
    }
}
