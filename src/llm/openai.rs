use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use log::debug;
use std::time::Instant;

use super::LanguageModel;
use crate::error::{InsightError, Result};

/// OpenAI-compatible chat completions for a single model
#[derive(Clone)]
pub struct OpenAIChat {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChat {
    /// Chat client for `model` at `api_base`
    pub fn new(api_key: &str, api_base: &str, model: &str, temperature: f32) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base.trim_end_matches('/'));
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            temperature,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAIChat {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, instructions: &str, input: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(instructions)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(input)
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .temperature(self.temperature)
            .messages(messages)
            .build()?;

        let start = Instant::now();
        let response = self.client.chat().create(request).await?;
        debug!("{} answered in {}ms", self.model, start.elapsed().as_millis());

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| InsightError::LLM(format!("{} returned an empty completion", self.model)))
    }
}
