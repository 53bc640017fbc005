//! The classification, routing, dispatch, and verification loop.
//!
//! One turn moves through an explicit one-pass state machine:
//!
//! ```text
//! Classifying ──► Routing ──► Dispatching ──► Done
//!                    │                          ▲
//!                    └── unrecognized label ────┘
//! ```
//!
//! No state is revisited. Every failure along the way degrades to
//! user-facing text, so [`Orchestrator::handle`] always returns an answer.

mod router;
mod supervisor;
mod verify;
mod workers;

pub use router::{route, Category, UNRECOGNIZED_REPLY};
pub use verify::SummaryVerifier;

use std::sync::Arc;

use crate::capability::{
    GeneralResponder, QueryClassifier, RetrievalResponder, SourceLookup, Summarizer,
};
use crate::session::Session;

/// The capability ports one orchestrator dispatches against.
pub struct Capabilities {
    pub classifier: Arc<dyn QueryClassifier>,
    pub lookup: Arc<dyn SourceLookup>,
    pub summarizer: Arc<dyn Summarizer>,
    pub general: Arc<dyn GeneralResponder>,
    pub retrieval: Arc<dyn RetrievalResponder>,
}

/// Progress of one turn through the pipeline.
///
/// The chosen category is carried in the state itself, so a worker can only
/// be dispatched after routing has produced one, and the final reply is set
/// exactly once, at `Done`.
enum TurnPhase {
    Classifying,
    Routing { label: String },
    Dispatching { category: Category },
    Done { reply: String },
}

/// Sequences supervisor, router, worker dispatch, and history bookkeeping.
pub struct Orchestrator {
    caps: Arc<Capabilities>,
}

impl Orchestrator {
    pub fn new(caps: Arc<Capabilities>) -> Self {
        Self { caps }
    }

    /// Run one query through the pipeline.
    ///
    /// Always returns user-facing text; capability failures degrade per the
    /// supervisor/worker policies instead of propagating. The query/reply
    /// pair is appended to the session history once the reply is known.
    ///
    /// Turns of the same session must be serialized by the caller; turns of
    /// different sessions may run concurrently.
    pub async fn handle(&self, query: &str, session: &mut Session) -> String {
        let mut phase = TurnPhase::Classifying;

        let reply = loop {
            phase = match phase {
                TurnPhase::Classifying => {
                    let label = supervisor::classify_or_default(
                        self.caps.classifier.as_ref(),
                        query,
                        &session.history,
                    )
                    .await;
                    TurnPhase::Routing { label }
                }

                TurnPhase::Routing { label } => {
                    let category = router::route(&label);
                    tracing::info!(
                        label = %label.trim(),
                        worker = category.worker_name(),
                        "Routed query"
                    );
                    match category {
                        Category::Unknown => {
                            tracing::warn!(label = %label.trim(), "Unrecognized label");
                            TurnPhase::Done {
                                reply: UNRECOGNIZED_REPLY.to_string(),
                            }
                        }
                        _ => TurnPhase::Dispatching { category },
                    }
                }

                TurnPhase::Dispatching { category } => {
                    let reply = workers::dispatch(&self.caps, category, query).await;
                    TurnPhase::Done { reply }
                }

                TurnPhase::Done { reply } => break reply,
            };
        };

        session.history.record_exchange(query, &reply);
        session.touch();
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{
        ClassificationError, GenerationError, LookupError, SummaryRequest,
    };
    use crate::session::ConversationHistory;
    use crate::workflow::verify::{SHORTFALL_NOTICE, STANDARD_TARGET_WORDS};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ---- Stub capabilities ----

    /// Classifier returning a fixed label, or an error when `label` is None.
    struct StubClassifier {
        label: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubClassifier {
        fn new(label: Option<&'static str>) -> Self {
            Self {
                label,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QueryClassifier for StubClassifier {
        async fn classify(
            &self,
            _query: &str,
            _history: &ConversationHistory,
        ) -> Result<String, ClassificationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.label {
                Some(label) => Ok(label.to_string()),
                None => Err(ClassificationError::Upstream("model unavailable".into())),
            }
        }
    }

    /// Lookup returning fixed content, or NotFound when `content` is None.
    struct StubLookup {
        content: Option<String>,
        calls: AtomicUsize,
    }

    impl StubLookup {
        fn new(content: Option<&str>) -> Self {
            Self {
                content: content.map(str::to_string),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SourceLookup for StubLookup {
        async fn fetch(&self, topic: &str) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.content
                .clone()
                .ok_or_else(|| LookupError::NotFound(topic.to_string()))
        }
    }

    /// Summarizer producing a fixed word count per attempt.
    struct StubSummarizer {
        detail: bool,
        words: usize,
        calls: AtomicUsize,
    }

    impl StubSummarizer {
        fn new(detail: bool, words: usize) -> Self {
            Self {
                detail,
                words,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn detect_detail_request(&self, _query: &str) -> Result<bool, GenerationError> {
            Ok(self.detail)
        }

        async fn summarize(&self, _request: &SummaryRequest) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec!["word"; self.words].join(" "))
        }
    }

    /// Responder echoing a fixed reply; counts invocations.
    struct StubResponder {
        reply: &'static str,
        calls: AtomicUsize,
    }

    impl StubResponder {
        fn new(reply: &'static str) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GeneralResponder for StubResponder {
        async fn respond(&self, _query: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    #[async_trait]
    impl RetrievalResponder for StubResponder {
        async fn respond(&self, _query: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.to_string())
        }
    }

    struct Fixture {
        classifier: Arc<StubClassifier>,
        lookup: Arc<StubLookup>,
        summarizer: Arc<StubSummarizer>,
        general: Arc<StubResponder>,
        retrieval: Arc<StubResponder>,
        orchestrator: Orchestrator,
    }

    fn fixture(
        label: Option<&'static str>,
        source: Option<&str>,
        detail: bool,
        summary_words: usize,
    ) -> Fixture {
        let classifier = Arc::new(StubClassifier::new(label));
        let lookup = Arc::new(StubLookup::new(source));
        let summarizer = Arc::new(StubSummarizer::new(detail, summary_words));
        let general = Arc::new(StubResponder::new("chitchat reply"));
        let retrieval = Arc::new(StubResponder::new("rag reply"));

        let caps = Arc::new(Capabilities {
            classifier: classifier.clone(),
            lookup: lookup.clone(),
            summarizer: summarizer.clone(),
            general: general.clone(),
            retrieval: retrieval.clone(),
        });

        Fixture {
            classifier,
            lookup,
            summarizer,
            general,
            retrieval,
            orchestrator: Orchestrator::new(caps),
        }
    }

    fn calls(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    // ---- End-to-end scenarios ----

    #[tokio::test]
    async fn test_general_query_returns_chitchat_verbatim() {
        let f = fixture(Some("General"), None, false, 0);
        let mut session = Session::new();

        let reply = f.orchestrator.handle("Hi, how are you?", &mut session).await;

        assert_eq!(reply, "chitchat reply");
        assert_eq!(calls(&f.general.calls), 1);
        assert_eq!(calls(&f.retrieval.calls), 0);
        assert_eq!(calls(&f.lookup.calls), 0);
    }

    #[tokio::test]
    async fn test_retrieve_query_returns_rag_verbatim() {
        let f = fixture(Some("Retrieve"), None, false, 0);
        let mut session = Session::new();

        let reply = f
            .orchestrator
            .handle("Use RAG to answer this", &mut session)
            .await;

        assert_eq!(reply, "rag reply");
        assert_eq!(calls(&f.retrieval.calls), 1);
        assert_eq!(calls(&f.summarizer.calls), 0);
        assert_eq!(calls(&f.lookup.calls), 0);
    }

    #[tokio::test]
    async fn test_detail_research_short_summaries_disclose() {
        // 50-word source, detail request, 40-word summaries on both attempts.
        let source = vec!["src"; 50].join(" ");
        let f = fixture(Some("Research"), Some(&source), true, 40);
        let mut session = Session::new();

        let reply = f
            .orchestrator
            .handle("Tell me about black holes, more details please", &mut session)
            .await;

        assert_eq!(calls(&f.summarizer.calls), 2);
        assert!(reply.contains(SHORTFALL_NOTICE));
        assert!(reply.starts_with(&vec!["word"; 40].join(" ")));
    }

    #[tokio::test]
    async fn test_research_on_target_no_disclosure() {
        let f = fixture(Some("Research"), Some("source text"), false, STANDARD_TARGET_WORDS);
        let mut session = Session::new();

        let reply = f.orchestrator.handle("Tell me about comets", &mut session).await;

        assert_eq!(calls(&f.summarizer.calls), 1);
        assert!(!reply.contains(SHORTFALL_NOTICE));
    }

    // ---- Degradation paths ----

    #[tokio::test]
    async fn test_classifier_failure_defaults_to_research() {
        let f = fixture(None, Some("source text"), false, STANDARD_TARGET_WORDS);
        let mut session = Session::new();

        let reply = f.orchestrator.handle("anything", &mut session).await;

        // Degraded to the research path and still completed.
        assert!(!reply.is_empty());
        assert_eq!(calls(&f.lookup.calls), 1);
        assert_eq!(calls(&f.general.calls), 0);
        assert_eq!(calls(&f.retrieval.calls), 0);
    }

    #[tokio::test]
    async fn test_unrecognized_label_terminal_no_worker() {
        let f = fixture(Some("Banana"), Some("source"), false, 10);
        let mut session = Session::new();

        let reply = f.orchestrator.handle("whatever", &mut session).await;

        assert_eq!(reply, UNRECOGNIZED_REPLY);
        assert_eq!(calls(&f.general.calls), 0);
        assert_eq!(calls(&f.retrieval.calls), 0);
        assert_eq!(calls(&f.lookup.calls), 0);
        assert_eq!(calls(&f.summarizer.calls), 0);
    }

    #[tokio::test]
    async fn test_lookup_not_found_produces_text() {
        let f = fixture(Some("Research"), None, false, 0);
        let mut session = Session::new();

        let reply = f
            .orchestrator
            .handle("Tell me about florgleblorp", &mut session)
            .await;

        assert!(reply.contains("could not find"));
        assert_eq!(calls(&f.summarizer.calls), 0);
    }

    // ---- Precedence through the full pipeline ----

    #[tokio::test]
    async fn test_label_with_competing_keywords_prefers_retrieve() {
        let f = fixture(Some("general research retrieve"), None, false, 0);
        let mut session = Session::new();

        let reply = f.orchestrator.handle("query", &mut session).await;

        assert_eq!(reply, "rag reply");
        assert_eq!(calls(&f.general.calls), 0);
    }

    // ---- History bookkeeping ----

    #[tokio::test]
    async fn test_history_grows_by_one_exchange_per_turn() {
        let f = fixture(Some("General"), None, false, 0);
        let mut session = Session::new();

        f.orchestrator.handle("first", &mut session).await;
        assert_eq!(session.history.len(), 2);

        f.orchestrator.handle("second", &mut session).await;
        assert_eq!(session.history.len(), 4);

        let texts: Vec<_> = session
            .history
            .turns()
            .iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["first", "chitchat reply", "second", "chitchat reply"]);
    }

    #[tokio::test]
    async fn test_unrecognized_label_still_recorded_in_history() {
        let f = fixture(Some("???"), None, false, 0);
        let mut session = Session::new();

        f.orchestrator.handle("query", &mut session).await;

        assert_eq!(session.history.len(), 2);
        assert_eq!(session.history.turns()[1].text, UNRECOGNIZED_REPLY);
    }

    #[tokio::test]
    async fn test_idempotent_for_identical_inputs() {
        let f1 = fixture(Some("General"), None, false, 0);
        let f2 = fixture(Some("General"), None, false, 0);

        let mut s1 = Session::new();
        let mut s2 = Session::new();

        let r1 = f1.orchestrator.handle("hello", &mut s1).await;
        let r2 = f2.orchestrator.handle("hello", &mut s2).await;

        assert_eq!(r1, r2);
        assert_eq!(s1.history.len(), s2.history.len());
        assert_eq!(s1.history.len(), 2);
    }

    #[tokio::test]
    async fn test_classifier_sees_prior_history() {
        let f = fixture(Some("General"), None, false, 0);
        let mut session = Session::new();

        f.orchestrator.handle("first", &mut session).await;
        f.orchestrator.handle("second", &mut session).await;

        // One classification per turn, each against the session history.
        assert_eq!(calls(&f.classifier.calls), 2);
    }
}
