//! Summary length verification with one bounded regeneration.
//!
//! The research path promises an approximate word count, not an exact one.
//! The verifier measures the generated summary and regenerates exactly once
//! with escalated instructions when the result falls materially short; a
//! still-short second attempt is accepted with a disclosure note appended.
//! A turn never fails on length alone.

use crate::capability::{GenerationError, Summarizer, SummaryRequest};

/// Word target for elaborated ("more details") summaries.
pub(crate) const DETAIL_TARGET_WORDS: usize = 1000;

/// Word target for standard summaries.
pub(crate) const STANDARD_TARGET_WORDS: usize = 500;

/// A summary below this fraction of its target counts as a shortfall.
const SHORTFALL_RATIO: f64 = 0.7;

/// Appended when the bounded retry still misses the target.
pub(crate) const SHORTFALL_NOTICE: &str = "Note: This summary is shorter than requested \
but contains the most relevant information available.";

/// Returned when the lookup produced no usable content.
pub(crate) const EMPTY_SOURCE_REPLY: &str = "I could not find any reference material on \
that topic, so I cannot provide a summary. You could try rephrasing the question or \
asking about a related topic.";

/// Count whitespace-delimited tokens.
pub(crate) fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn is_short(text: &str, target_words: usize) -> bool {
    (word_count(text) as f64) < SHORTFALL_RATIO * target_words as f64
}

/// Length-verifying wrapper around the summarization capability.
pub struct SummaryVerifier<'a> {
    summarizer: &'a dyn Summarizer,
}

impl<'a> SummaryVerifier<'a> {
    pub fn new(summarizer: &'a dyn Summarizer) -> Self {
        Self { summarizer }
    }

    /// Produce a length-verified summary of `source` answering `query`.
    ///
    /// Steps: detect elaboration intent (defaulting to a standard summary if
    /// detection fails), pick the word target, summarize, and regenerate at
    /// most once on a shortfall.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` only when the summarization call itself
    /// fails; length misses are not errors.
    pub async fn verify(&self, query: &str, source: &str) -> Result<String, GenerationError> {
        if source.trim().is_empty() {
            return Ok(EMPTY_SOURCE_REPLY.to_string());
        }

        // Documented default: a failed detail check falls back to the
        // standard summary tier.
        let detail_request = match self.summarizer.detect_detail_request(query).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!("Detail detection failed, using standard summary: {}", e);
                false
            }
        };

        let target_words = if detail_request {
            DETAIL_TARGET_WORDS
        } else {
            STANDARD_TARGET_WORDS
        };

        let mut request = SummaryRequest {
            query: query.to_string(),
            source_content: source.to_string(),
            target_words,
            detail_request,
            escalated: false,
        };

        let mut summary = self.summarizer.summarize(&request).await?;

        if is_short(&summary, target_words) {
            tracing::warn!(
                words = word_count(&summary),
                target = target_words,
                "Summary is too short, regenerating with stronger length requirement"
            );

            request.escalated = true;
            summary = self.summarizer.summarize(&request).await?;

            if is_short(&summary, target_words) {
                tracing::warn!(
                    words = word_count(&summary),
                    target = target_words,
                    "Summary is still shorter than desired, proceeding with response"
                );
                summary.push_str("\n\n");
                summary.push_str(SHORTFALL_NOTICE);
            }
        }

        Ok(summary)
    }
}
