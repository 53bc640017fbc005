//! Conversational responder for general queries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationError, GeneralResponder};
use crate::llm::{ChatMessage, ChatOptions, LlmClient};

const PERSONA_PROMPT: &str = "\
You are a friendly and knowledgeable assistant with a warm, engaging personality. \
You are enthusiastic about technology and enjoy explaining complex concepts in simple \
terms, occasionally using analogies and examples to make explanations relatable. \
Be patient and thorough in your responses, but concise when appropriate.";

/// LLM-backed responder for greetings and small talk.
pub struct LlmGeneralResponder {
    llm: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl LlmGeneralResponder {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            llm,
            model: model.into(),
            timeout,
        }
    }
}

#[async_trait]
impl GeneralResponder for LlmGeneralResponder {
    async fn respond(&self, query: &str) -> Result<String, GenerationError> {
        let messages = vec![
            ChatMessage::system(PERSONA_PROMPT),
            ChatMessage::user(query),
        ];

        // Slightly warm sampling for personality; capped output length.
        let options = ChatOptions {
            temperature: Some(0.5),
            top_p: Some(0.9),
            max_tokens: Some(1024),
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.llm
                .chat_completion_with_options(&self.model, &messages, options),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.timeout))??;

        response
            .text()
            .map(str::to_string)
            .ok_or(GenerationError::EmptyOutput)
    }
}
