//! switchboard - HTTP server entry point.
//!
//! Wires the live capabilities (OpenRouter-backed classifier, summarizer,
//! and chitchat responder; MediaWiki lookup; external retrieval service)
//! and starts the HTTP server.

use std::sync::Arc;

use switchboard::api;
use switchboard::capability::{
    HttpRetrievalResponder, LlmClassifier, LlmGeneralResponder, LlmSummarizer, WikipediaLookup,
};
use switchboard::config::Config;
use switchboard::llm::{LlmClient, OpenRouterClient};
use switchboard::workflow::Capabilities;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        model = %config.default_model,
        chitchat_model = %config.chitchat_model,
        "Loaded configuration"
    );

    let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::new(config.api_key.clone()));
    let timeout = config.capability_timeout;

    let caps = Arc::new(Capabilities {
        classifier: Arc::new(LlmClassifier::new(
            Arc::clone(&llm),
            config.default_model.clone(),
            timeout,
        )),
        lookup: Arc::new(WikipediaLookup::new(
            Arc::clone(&llm),
            config.default_model.clone(),
            config.wikipedia_api_url.clone(),
            timeout,
        )),
        summarizer: Arc::new(LlmSummarizer::new(
            Arc::clone(&llm),
            config.default_model.clone(),
            timeout,
        )),
        general: Arc::new(LlmGeneralResponder::new(
            Arc::clone(&llm),
            config.chitchat_model.clone(),
            timeout,
        )),
        retrieval: Arc::new(HttpRetrievalResponder::new(
            config.rag_endpoint.clone(),
            timeout,
        )),
    });

    api::serve(config, caps).await
}
