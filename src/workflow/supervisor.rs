//! Supervisor: query classification with graceful degradation.

use crate::capability::QueryClassifier;
use crate::session::ConversationHistory;

/// Label substituted when the classifier fails.
///
/// Research is the most general-purpose path, so an unavailable classifier
/// degrades there rather than aborting the turn.
pub(crate) const DEFAULT_LABEL: &str = "Research";

/// Classify a query against the running history.
///
/// Never fails: classifier errors (timeouts, malformed output, upstream
/// faults) are logged and replaced with [`DEFAULT_LABEL`] so the turn can
/// proceed.
pub(crate) async fn classify_or_default(
    classifier: &dyn QueryClassifier,
    query: &str,
    history: &ConversationHistory,
) -> String {
    match classifier.classify(query, history).await {
        Ok(label) => {
            tracing::debug!(label = %label.trim(), "classifier returned label");
            label
        }
        Err(e) => {
            tracing::warn!(
                "Classification failed, defaulting to {}: {}",
                DEFAULT_LABEL,
                e
            );
            DEFAULT_LABEL.to_string()
        }
    }
}
