//! Configuration management for Switchboard.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. API key for the chat-completion provider.
//! - `DEFAULT_MODEL` - Optional. Model used for classification, topic
//!   extraction, and summarization. Defaults to `openai/gpt-4o-mini`.
//! - `CHITCHAT_MODEL` - Optional. Model used by the conversational responder.
//!   Defaults to `DEFAULT_MODEL`.
//! - `RAG_ENDPOINT` - Optional. Base URL of the external retrieval service.
//!   Defaults to `http://127.0.0.1:8081/generate`.
//! - `WIKIPEDIA_API_URL` - Optional. MediaWiki API endpoint used by the
//!   research lookup. Defaults to `https://en.wikipedia.org/w/api.php`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `5000`.
//! - `CAPABILITY_TIMEOUT_SECS` - Optional. Deadline per external capability
//!   call. Defaults to `60`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the chat-completion provider
    pub api_key: String,

    /// Default model identifier (OpenRouter format)
    pub default_model: String,

    /// Model used by the conversational responder
    pub chitchat_model: String,

    /// Endpoint of the external retrieval (RAG) service
    pub rag_endpoint: String,

    /// MediaWiki API endpoint for the research lookup
    pub wikipedia_api_url: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Deadline applied to each external capability call
    pub capability_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let default_model =
            std::env::var("DEFAULT_MODEL").unwrap_or_else(|_| "openai/gpt-4o-mini".to_string());

        let chitchat_model =
            std::env::var("CHITCHAT_MODEL").unwrap_or_else(|_| default_model.clone());

        let rag_endpoint = std::env::var("RAG_ENDPOINT")
            .unwrap_or_else(|_| "http://127.0.0.1:8081/generate".to_string());

        let wikipedia_api_url = std::env::var("WIKIPEDIA_API_URL")
            .unwrap_or_else(|_| "https://en.wikipedia.org/w/api.php".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let timeout_secs: u64 = std::env::var("CAPABILITY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("CAPABILITY_TIMEOUT_SECS".to_string(), format!("{}", e))
            })?;

        Ok(Self {
            api_key,
            default_model,
            chitchat_model,
            rag_endpoint,
            wikipedia_api_url,
            host,
            port,
            capability_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String) -> Self {
        Self {
            api_key,
            chitchat_model: default_model.clone(),
            default_model,
            rag_endpoint: "http://127.0.0.1:8081/generate".to_string(),
            wikipedia_api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            capability_timeout: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let config = Config::new("key".to_string(), "openai/gpt-4o-mini".to_string());
        assert_eq!(config.chitchat_model, config.default_model);
        assert_eq!(config.port, 5000);
        assert_eq!(config.capability_timeout, Duration::from_secs(60));
    }
}
