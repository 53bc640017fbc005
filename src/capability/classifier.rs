//! LLM-backed query classifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{ClassificationError, QueryClassifier};
use crate::llm::{ChatMessage, ChatOptions, LlmClient};
use crate::session::ConversationHistory;

/// How many recent history turns are threaded into the classification prompt.
const HISTORY_CONTEXT_TURNS: usize = 10;

const ROUTER_PROMPT: &str = "\
Given the user input below, classify it as either being about 'Research', 'Retrieve' or 'General' topic.
Just use one of these words as your response.
'Research' - any question requiring factual knowledge on a specific topic from reference sources, such as \"tell me about quantum computing\" or \"who was Marie Curie?\"
'Retrieve' - any question about the contents of the document store, or any query that explicitly mentions RAG, retrieval, or the indexed documents.
'General' - greetings, small talk, and everything else that does not fall into the above topics.";

/// Classifier that asks a chat model for a one-word category label.
///
/// The raw response text is returned unmodified; verbose or punctuated
/// labels are the router's problem.
pub struct LlmClassifier {
    llm: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl LlmClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            llm,
            model: model.into(),
            timeout,
        }
    }

    fn build_user_message(query: &str, history: &ConversationHistory) -> String {
        let mut message = String::new();
        if !history.is_empty() {
            message.push_str("Conversation so far:\n");
            message.push_str(&history.recent_lines(HISTORY_CONTEXT_TURNS));
            message.push_str("\n\n");
        }
        message.push_str("User query: ");
        message.push_str(query);
        message.push_str("\nClassification topic:");
        message
    }
}

#[async_trait]
impl QueryClassifier for LlmClassifier {
    async fn classify(
        &self,
        query: &str,
        history: &ConversationHistory,
    ) -> Result<String, ClassificationError> {
        let messages = vec![
            ChatMessage::system(ROUTER_PROMPT),
            ChatMessage::user(Self::build_user_message(query, history)),
        ];

        let options = ChatOptions {
            temperature: Some(0.0),
            ..ChatOptions::default()
        };

        let response = tokio::time::timeout(
            self.timeout,
            self.llm
                .chat_completion_with_options(&self.model, &messages, options),
        )
        .await
        .map_err(|_| ClassificationError::Timeout(self.timeout))??;

        response
            .text()
            .map(str::to_string)
            .ok_or(ClassificationError::EmptyOutput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_without_history() {
        let history = ConversationHistory::new();
        let message = LlmClassifier::build_user_message("Hi there", &history);
        assert!(message.starts_with("User query: Hi there"));
        assert!(!message.contains("Conversation so far"));
    }

    #[test]
    fn test_user_message_threads_history() {
        let mut history = ConversationHistory::new();
        history.record_exchange("tell me about comets", "Comets are icy bodies.");

        let message = LlmClassifier::build_user_message("more details please", &history);
        assert!(message.contains("Conversation so far:"));
        assert!(message.contains("user: tell me about comets"));
        assert!(message.contains("assistant: Comets are icy bodies."));
        assert!(message.contains("User query: more details please"));
    }
}
