//! API request and response types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::Turn;

/// Request to submit a chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's query text
    pub message: String,

    /// Existing session to continue; omitted to start a new session
    pub session_id: Option<Uuid>,
}

/// Response to a chat message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    /// The assistant's reply text
    pub reply: String,

    /// Session the exchange was recorded under
    pub session_id: Uuid,
}

/// Message history of one session.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub turns: Vec<Turn>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error payload returned with non-2xx statuses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
