//! Language model access.
//!
//! Stages only see the [`LanguageModel`] trait; the answer validation lives
//! with the stages in `processors::insights`.

mod openai;

use async_trait::async_trait;
use crate::error::Result;

pub use openai::OpenAIChat;

/// A chat-style completion endpoint bound to one model
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Model identifier, for logs
    fn name(&self) -> &str;

    /// Sends fixed `instructions` plus one `input` and returns the raw answer text
    async fn complete(&self, instructions: &str, input: &str) -> Result<String>;
}
