//! Worker dispatch: one terminal responder per routed category.
//!
//! Workers convert every capability failure into user-facing text; no error
//! from this module ever reaches the caller of the orchestrator.

use super::router::{Category, UNRECOGNIZED_REPLY};
use super::verify::SummaryVerifier;
use super::Capabilities;
use crate::capability::{GeneralResponder, LookupError, RetrievalResponder, SourceLookup};

/// Run the worker selected for `category` and return its user-facing reply.
pub(crate) async fn dispatch(caps: &Capabilities, category: Category, query: &str) -> String {
    match category {
        Category::Retrieve => {
            tracing::info!(worker = "rag", "Processing with retrieval worker");
            match caps.retrieval.respond(query).await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::error!(worker = "rag", "Retrieval request failed: {}", e);
                    format!("Error processing retrieval request: {}", e)
                }
            }
        }

        Category::General => {
            tracing::info!(worker = "chitchat", "Processing with chitchat worker");
            match caps.general.respond(query).await {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::error!(worker = "chitchat", "Chitchat request failed: {}", e);
                    format!("Error processing conversation request: {}", e)
                }
            }
        }

        Category::Research => {
            tracing::info!(worker = "research", "Processing with research worker");
            research(caps, query).await
        }

        // Routing resolves Unknown before dispatch; reaching this arm is a
        // contract violation in the routing precedence logic.
        Category::Unknown => {
            debug_assert!(false, "Unknown category must terminate in routing");
            UNRECOGNIZED_REPLY.to_string()
        }
    }
}

/// The research worker: fetch source content, then length-verified summary.
async fn research(caps: &Capabilities, query: &str) -> String {
    let source = match caps.lookup.fetch(query).await {
        Ok(content) => content,
        Err(LookupError::NotFound(topic)) => {
            tracing::warn!(worker = "research", "No source found for topic: {}", topic);
            return format!(
                "I could not find any reference material for \"{}\". \
                 You could try rephrasing the question or asking about a related topic.",
                topic
            );
        }
        Err(e) => {
            tracing::error!(worker = "research", "Source lookup failed: {}", e);
            return format!("Error processing research request: {}", e);
        }
    };

    match SummaryVerifier::new(caps.summarizer.as_ref())
        .verify(query, &source)
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(worker = "research", "Summarization failed: {}", e);
            format!("Error processing research request: {}", e)
        }
    }
}
