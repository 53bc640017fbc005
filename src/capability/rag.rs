//! Retrieval responder backed by an external RAG service.
//!
//! The retrieval pipeline itself (vector store, reranking, generation) lives
//! in a separate service; this client forwards the raw query and returns the
//! service's answer verbatim.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{GenerationError, RetrievalResponder};

/// Client for the external retrieval service.
pub struct HttpRetrievalResponder {
    http: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpRetrievalResponder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

#[derive(Debug, Serialize)]
struct RetrievalRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct RetrievalReply {
    answer: String,
}

#[async_trait]
impl RetrievalResponder for HttpRetrievalResponder {
    async fn respond(&self, query: &str) -> Result<String, GenerationError> {
        let response = tokio::time::timeout(
            self.timeout,
            self.http
                .post(&self.endpoint)
                .json(&RetrievalRequest { query })
                .send(),
        )
        .await
        .map_err(|_| GenerationError::Timeout(self.timeout))?
        .map_err(|e| GenerationError::Upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Upstream(format!(
                "retrieval service returned HTTP {}",
                status.as_u16()
            )));
        }

        let reply: RetrievalReply = response
            .json()
            .await
            .map_err(|e| GenerationError::Upstream(format!("failed to parse response: {}", e)))?;

        Ok(reply.answer)
    }
}
