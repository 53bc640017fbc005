//! LLM error types with retry classification.
//!
//! Distinguishes transient errors (retry with backoff) from permanent errors.

use std::time::Duration;

/// Error from LLM API calls.
#[derive(Debug)]
pub struct LlmError {
    /// The kind of error
    pub kind: LlmErrorKind,
    /// HTTP status code, if applicable
    pub status_code: Option<u16>,
    /// Error message
    pub message: String,
    /// Suggested retry delay (from Retry-After header or calculated)
    pub retry_after: Option<Duration>,
}

impl LlmError {
    /// Create a rate limit error.
    pub fn rate_limited(message: String, retry_after: Option<Duration>) -> Self {
        Self {
            kind: LlmErrorKind::RateLimited,
            status_code: Some(429),
            message,
            retry_after,
        }
    }

    /// Create a server error.
    pub fn server_error(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ServerError,
            status_code: Some(status_code),
            message,
            retry_after: None,
        }
    }

    /// Create a client error (bad request, auth, etc.).
    pub fn client_error(status_code: u16, message: String) -> Self {
        Self {
            kind: LlmErrorKind::ClientError,
            status_code: Some(status_code),
            message,
            retry_after: None,
        }
    }

    /// Create a network error.
    pub fn network_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::NetworkError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Create a parse error.
    pub fn parse_error(message: String) -> Self {
        Self {
            kind: LlmErrorKind::ParseError,
            status_code: None,
            message,
            retry_after: None,
        }
    }

    /// Check if this error is transient and should be retried.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }

    /// Get the suggested delay before retry.
    ///
    /// Returns `retry_after` if set, otherwise exponential backoff with a
    /// small deterministic jitter, capped at 60 seconds.
    pub fn suggested_delay(&self, attempt: u32) -> Duration {
        if let Some(retry_after) = self.retry_after {
            return retry_after;
        }

        let base_delay = match self.kind {
            LlmErrorKind::RateLimited => Duration::from_secs(5),
            LlmErrorKind::ServerError => Duration::from_secs(2),
            _ => Duration::from_secs(1),
        };

        let multiplier = 2u64.saturating_pow(attempt);
        let delay_secs = base_delay.as_secs().saturating_mul(multiplier);

        let jitter_range = delay_secs / 4;
        let jitter = if jitter_range > 0 {
            (attempt as u64 * 7) % jitter_range
        } else {
            0
        };

        Duration::from_secs((delay_secs + jitter).min(60))
    }
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "{} (HTTP {}): {}", self.kind, code, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for LlmError {}

/// Classification of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Rate limited (429) - transient, retry with backoff
    RateLimited,
    /// Server error (500, 502, 503, 504) - transient, retry
    ServerError,
    /// Client error (400, 401, 403, 404) - permanent
    ClientError,
    /// Network error (connection failed, timeout) - transient, retry
    NetworkError,
    /// Response parsing error - permanent
    ParseError,
}

impl LlmErrorKind {
    /// Check if this error kind is transient (should retry).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmErrorKind::RateLimited | LlmErrorKind::ServerError | LlmErrorKind::NetworkError
        )
    }
}

impl std::fmt::Display for LlmErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmErrorKind::RateLimited => write!(f, "Rate limited"),
            LlmErrorKind::ServerError => write!(f, "Server error"),
            LlmErrorKind::ClientError => write!(f, "Client error"),
            LlmErrorKind::NetworkError => write!(f, "Network error"),
            LlmErrorKind::ParseError => write!(f, "Parse error"),
        }
    }
}

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Maximum total time to spend retrying
    pub max_retry_duration: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            max_retry_duration: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Check if the given error should be retried under this config.
    pub fn should_retry(&self, error: &LlmError) -> bool {
        error.is_transient()
    }
}

/// Parse HTTP status code into error kind.
pub fn classify_http_status(status: u16) -> LlmErrorKind {
    match status {
        429 => LlmErrorKind::RateLimited,
        500 | 502 | 503 | 504 => LlmErrorKind::ServerError,
        400..=499 => LlmErrorKind::ClientError,
        _ => LlmErrorKind::ServerError,
    }
}
