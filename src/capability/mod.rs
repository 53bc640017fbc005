//! Capability ports: the external seams the workflow depends on.
//!
//! Each port is a small call/response contract. The live implementations
//! call an LLM provider or an HTTP service; tests substitute stubs. Every
//! port failure is typed so the workflow can apply its degrade policy at
//! the point of call.

mod chitchat;
mod classifier;
mod rag;
mod research;

pub use chitchat::LlmGeneralResponder;
pub use classifier::LlmClassifier;
pub use rag::HttpRetrievalResponder;
pub use research::{LlmSummarizer, WikipediaLookup};

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::llm::LlmError;
use crate::session::ConversationHistory;

/// Errors from the classification capability.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classification call failed: {0}")]
    Upstream(String),

    #[error("classification timed out after {0:?}")]
    Timeout(Duration),

    #[error("classifier returned no output")]
    EmptyOutput,
}

impl From<LlmError> for ClassificationError {
    fn from(e: LlmError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Errors from the source lookup capability.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no source found for topic: {0}")]
    NotFound(String),

    #[error("lookup call failed: {0}")]
    Upstream(String),

    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors from text-generating capabilities (summarizer, responders).
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation call failed: {0}")]
    Upstream(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("model returned no output")]
    EmptyOutput,
}

impl From<LlmError> for GenerationError {
    fn from(e: LlmError) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Inputs for one summarization attempt.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// The user's question the summary must answer
    pub query: String,

    /// Source material to summarize
    pub source_content: String,

    /// Approximate word-count target
    pub target_words: usize,

    /// Whether the user asked for an elaborated answer
    pub detail_request: bool,

    /// Set on the bounded second attempt after a length shortfall; the
    /// generator receives escalated length instructions.
    pub escalated: bool,
}

/// Classifies a query into a worker category label.
///
/// Returns the raw label text, pre-normalization; the router owns the
/// mapping onto categories.
#[async_trait]
pub trait QueryClassifier: Send + Sync {
    async fn classify(
        &self,
        query: &str,
        history: &ConversationHistory,
    ) -> Result<String, ClassificationError>;
}

/// Fetches reference source content for a topic.
#[async_trait]
pub trait SourceLookup: Send + Sync {
    async fn fetch(&self, topic: &str) -> Result<String, LookupError>;
}

/// Generates length-targeted summaries and detects elaboration intent.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Whether the query asks for an elaborated, longer answer.
    async fn detect_detail_request(&self, query: &str) -> Result<bool, GenerationError>;

    /// Produce a summary per the request's target and detail level.
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, GenerationError>;
}

/// Answers casual conversation queries.
#[async_trait]
pub trait GeneralResponder: Send + Sync {
    async fn respond(&self, query: &str) -> Result<String, GenerationError>;
}

/// Answers document-store queries via the external retrieval service.
#[async_trait]
pub trait RetrievalResponder: Send + Sync {
    async fn respond(&self, query: &str) -> Result<String, GenerationError>;
}
