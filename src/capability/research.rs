//! Research capabilities: encyclopedia lookup and length-targeted summarization.
//!
//! `WikipediaLookup` resolves a free-text query to page content in two steps:
//! an LLM call extracts the main subject, then the MediaWiki API is queried
//! for a plain-text extract, falling back to full-text search when the direct
//! title misses. `LlmSummarizer` condenses the fetched content to a word
//! target and detects elaboration intent in the query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{GenerationError, LookupError, SourceLookup, Summarizer, SummaryRequest};
use crate::llm::{ChatMessage, ChatOptions, LlmClient};

const TOPIC_PROMPT: &str = "\
Extract the main subject or topic from the following query. Return ONLY the main subject, nothing else.
Do not add any explanations or additional text.";

/// Encyclopedia lookup backed by the MediaWiki API.
pub struct WikipediaLookup {
    http: Client,
    llm: Arc<dyn LlmClient>,
    model: String,
    api_url: String,
    timeout: Duration,
}

impl WikipediaLookup {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            http: Client::new(),
            llm,
            model: model.into(),
            api_url: api_url.into(),
            timeout,
        }
    }

    /// Extract the main topic from the query, falling back to the raw query
    /// when the model call fails.
    async fn extract_topic(&self, query: &str) -> String {
        let messages = vec![
            ChatMessage::system(TOPIC_PROMPT),
            ChatMessage::user(format!("Query: {}\nMain subject:", query)),
        ];
        let options = ChatOptions {
            temperature: Some(0.0),
            ..ChatOptions::default()
        };

        let result = tokio::time::timeout(
            self.timeout,
            self.llm
                .chat_completion_with_options(&self.model, &messages, options),
        )
        .await;

        match result {
            Ok(Ok(response)) => match response.text() {
                Some(topic) => topic.trim_matches('"').to_string(),
                None => query.to_string(),
            },
            Ok(Err(e)) => {
                tracing::warn!("Topic extraction failed, using raw query: {}", e);
                query.to_string()
            }
            Err(_) => {
                tracing::warn!("Topic extraction timed out, using raw query");
                query.to_string()
            }
        }
    }

    async fn get_json(&self, url: &str) -> Result<QueryResponse, LookupError> {
        let response = tokio::time::timeout(self.timeout, self.http.get(url).send())
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?
            .map_err(|e| LookupError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Upstream(format!(
                "lookup service returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| LookupError::Upstream(format!("failed to parse response: {}", e)))
    }

    /// Fetch the plain-text extract for an exact page title.
    async fn page_extract(&self, title: &str) -> Result<Option<String>, LookupError> {
        let url = extract_url(&self.api_url, title);
        let parsed = self.get_json(&url).await?;

        Ok(parsed.query.and_then(|q| {
            q.pages.into_iter().next().and_then(|page| {
                if page.missing {
                    None
                } else {
                    page.extract.filter(|e| !e.trim().is_empty())
                }
            })
        }))
    }

    /// Find the best-matching page title via full-text search.
    async fn search_title(&self, topic: &str) -> Result<Option<String>, LookupError> {
        let url = search_url(&self.api_url, topic);
        let parsed = self.get_json(&url).await?;

        Ok(parsed
            .query
            .and_then(|q| q.search.into_iter().next().map(|hit| hit.title)))
    }
}

#[async_trait]
impl SourceLookup for WikipediaLookup {
    async fn fetch(&self, topic: &str) -> Result<String, LookupError> {
        let subject = self.extract_topic(topic).await;
        tracing::debug!("Looking up source content for subject: {}", subject);

        // Direct title first, then one search fallback.
        if let Some(content) = self.page_extract(&subject).await? {
            return Ok(content);
        }

        if let Some(title) = self.search_title(&subject).await? {
            if let Some(content) = self.page_extract(&title).await? {
                return Ok(content);
            }
        }

        Err(LookupError::NotFound(subject))
    }
}

fn extract_url(api_url: &str, title: &str) -> String {
    format!(
        "{}?action=query&format=json&formatversion=2&prop=extracts&explaintext=1&redirects=1&titles={}",
        api_url,
        urlencoding::encode(title)
    )
}

fn search_url(api_url: &str, topic: &str) -> String {
    format!(
        "{}?action=query&format=json&formatversion=2&list=search&srlimit=1&srsearch={}",
        api_url,
        urlencoding::encode(topic)
    )
}

/// MediaWiki `action=query` response (formatversion=2).
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryBody>,
}

#[derive(Debug, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<PageEntry>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct PageEntry {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: bool,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

/// Summarizer that asks a chat model for a word-targeted summary.
pub struct LlmSummarizer {
    llm: Arc<dyn LlmClient>,
    model: String,
    timeout: Duration,
}

impl LlmSummarizer {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            llm,
            model: model.into(),
            timeout,
        }
    }
}

fn detail_check_prompt(query: &str) -> String {
    format!(
        "Check if the query contains any of these expressions asking for more information:\n\
         - \"more details\"\n\
         - \"elaborate\"\n\
         - \"tell me more\"\n\
         - \"explain further\"\n\
         - \"more information\"\n\n\
         Query: {}\n\
         Return ONLY 'yes' if any of these expressions are present, otherwise 'no'.",
        query
    )
}

fn parse_yes_no(text: &str) -> bool {
    text.to_lowercase().contains("yes")
}

/// Extra instructions for the summary prompt based on detail level and
/// whether this is the escalated second attempt.
fn detail_instructions(request: &SummaryRequest) -> String {
    let detail_block = format!(
        "Since this is a request for more details, please:\n\
         1. Include more specific examples and facts\n\
         2. Provide deeper context and background information\n\
         3. Explain related concepts and their connections\n\
         4. Discuss implications and significance\n\
         5. Cover multiple aspects of the topic\n\
         6. Aim for approximately {} words while maintaining quality",
        request.target_words
    );

    match (request.detail_request, request.escalated) {
        (true, false) => detail_block,
        (true, true) => format!(
            "CRITICAL: your previous response was too short. Please provide a more detailed summary.\n{}",
            detail_block
        ),
        (false, true) => format!(
            "CRITICAL: your previous response was too short. Please provide a more detailed summary of approximately {} words.",
            request.target_words
        ),
        (false, false) => String::new(),
    }
}

fn summary_prompt(request: &SummaryRequest) -> String {
    format!(
        "You are a helpful assistant that summarizes information from reference articles.\n\
         You MUST provide a summary of {target} words, but make sure you complete the last sentence.\n\
         Focus on answering the user's question: {query}\n\n\
         Article content:\n\
         {content}\n\n\
         Please provide a well-structured summary that:\n\
         1. Directly answers the user's question\n\
         2. Uses complete sentences\n\
         3. Ends with a proper concluding sentence\n\
         4. Maintains a natural flow\n\
         5. Includes the most relevant information\n\
         {extra}\n\n\
         Remember: your summary should be approximately {target} words long, and the last sentence must be complete.\n\
         If the article content is not relevant to the question, say so instead of inventing an answer.\n\n\
         Summary:",
        target = request.target_words,
        query = request.query,
        content = request.source_content,
        extra = detail_instructions(request),
    )
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn detect_detail_request(&self, query: &str) -> Result<bool, GenerationError> {
        let messages = vec![ChatMessage::user(detail_check_prompt(query))];
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
        .map_err(|_| GenerationError::Timeout(self.timeout))??;

        match response.text() {
            Some(text) => Ok(parse_yes_no(text)),
            None => Err(GenerationError::EmptyOutput),
        }
    }

    async fn summarize(&self, request: &SummaryRequest) -> Result<String, GenerationError> {
        let messages = vec![ChatMessage::user(summary_prompt(request))];

        // Word targets translate to roughly 2x as many tokens; leave headroom
        // so the model is never cut off mid-sentence by the token cap.
        let options = ChatOptions {
            temperature: Some(0.2),
            max_tokens: Some((request.target_words as u64 * 2).max(512)),
            ..ChatOptions::default()
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

#[cfg(test)]
mod tests {
    use super::*;

    fn request(detail: bool, escalated: bool) -> SummaryRequest {
        SummaryRequest {
            query: "what are black holes".to_string(),
            source_content: "Black holes are regions of spacetime.".to_string(),
            target_words: 500,
            detail_request: detail,
            escalated,
        }
    }

    #[test]
    fn test_parse_yes_no() {
        assert!(parse_yes_no("yes"));
        assert!(parse_yes_no("Yes."));
        assert!(parse_yes_no("YES, it is"));
        assert!(!parse_yes_no("no"));
        assert!(!parse_yes_no("Not at all"));
    }

    #[test]
    fn test_summary_prompt_includes_target_and_query() {
        let prompt = summary_prompt(&request(false, false));
        assert!(prompt.contains("500 words"));
        assert!(prompt.contains("what are black holes"));
        assert!(prompt.contains("Black holes are regions of spacetime."));
        assert!(!prompt.contains("CRITICAL"));
    }

    #[test]
    fn test_detail_instructions_standard_first_attempt_empty() {
        assert!(detail_instructions(&request(false, false)).is_empty());
    }

    #[test]
    fn test_detail_instructions_detail_request() {
        let extra = detail_instructions(&request(true, false));
        assert!(extra.contains("more specific examples"));
        assert!(!extra.contains("CRITICAL"));
    }

    #[test]
    fn test_detail_instructions_escalated() {
        let extra = detail_instructions(&request(false, true));
        assert!(extra.contains("CRITICAL"));
        assert!(extra.contains("500"));

        let extra = detail_instructions(&request(true, true));
        assert!(extra.contains("CRITICAL"));
        assert!(extra.contains("multiple aspects"));
    }

    #[test]
    fn test_extract_url_encodes_title() {
        let url = extract_url("https://en.wikipedia.org/w/api.php", "black holes");
        assert!(url.contains("titles=black%20holes"));
        assert!(url.contains("prop=extracts"));
    }

    #[test]
    fn test_search_url_encodes_topic() {
        let url = search_url("https://en.wikipedia.org/w/api.php", "Ada Lovelace");
        assert!(url.contains("srsearch=Ada%20Lovelace"));
        assert!(url.contains("srlimit=1"));
    }

    #[test]
    fn test_query_response_parses_page_extract() {
        let body = r#"{"query":{"pages":[{"pageid":1,"title":"Black hole","extract":"A black hole is a region of spacetime."}]}}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        let pages = parsed.query.unwrap().pages;
        assert_eq!(
            pages[0].extract.as_deref(),
            Some("A black hole is a region of spacetime.")
        );
        assert!(!pages[0].missing);
    }

    #[test]
    fn test_query_response_parses_missing_page() {
        let body = r#"{"query":{"pages":[{"title":"No such page","missing":true}]}}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.query.unwrap().pages[0].missing);
    }

    #[test]
    fn test_query_response_parses_search_hits() {
        let body = r#"{"query":{"search":[{"ns":0,"title":"Black hole"}]}}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.query.unwrap().search[0].title, "Black hole");
    }
}
