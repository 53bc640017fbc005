//! HTTP surface for the switchboard service.
//!
//! Exposes the chat operation plus session inspection. Same-session turns
//! are serialized by holding the session's lock across the whole turn;
//! different sessions proceed concurrently.

pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;
use crate::session::{Session, SessionSummary};
use crate::workflow::{Capabilities, Orchestrator};

use types::*;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Sessions keyed by id; each behind its own lock so turns of different
    /// sessions never contend.
    pub sessions: RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>,
}

impl AppState {
    pub fn new(caps: Arc<Capabilities>) -> Self {
        Self {
            orchestrator: Orchestrator::new(caps),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Look up an existing session or create a fresh one.
    ///
    /// An unknown or omitted id yields a new session rather than an error,
    /// so clients can always just send a message.
    async fn get_or_create_session(&self, requested: Option<Uuid>) -> Arc<Mutex<Session>> {
        if let Some(id) = requested {
            let sessions = self.sessions.read().await;
            if let Some(session) = sessions.get(&id) {
                return Arc::clone(session);
            }
        }

        let session = Session::new();
        let id = session.id;
        let session = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, Arc::clone(&session));
        session
    }
}

/// Start the HTTP server.
pub async fn serve(config: Config, caps: Arc<Capabilities>) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(caps));
    let app = app_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the route table.
fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id/history", get(session_history))
        .route("/api/sessions/:id", delete(delete_session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handle one chat turn.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ErrorResponse>)> {
    if request.message.trim().is_empty() {
        return Err(bad_request("message must not be empty"));
    }

    let session_ref = state.get_or_create_session(request.session_id).await;

    // Holding the lock across the turn serializes turns of this session.
    let mut session = session_ref.lock().await;
    let reply = state.orchestrator.handle(&request.message, &mut session).await;

    Ok(Json(ChatReply {
        reply,
        session_id: session.id,
    }))
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> Json<Vec<SessionSummary>> {
    let sessions = state.sessions.read().await;
    let mut summaries = Vec::with_capacity(sessions.len());
    for session in sessions.values() {
        summaries.push(SessionSummary::of(&*session.lock().await));
    }
    summaries.sort_by_key(|s| s.created_at);
    Json(summaries)
}

async fn session_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let sessions = state.sessions.read().await;
    match sessions.get(&id) {
        Some(session) => {
            let session = session.lock().await;
            Ok(Json(HistoryResponse {
                session_id: id,
                turns: session.history.turns().to_vec(),
            }))
        }
        None => Err(not_found(id)),
    }
}

async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let mut sessions = state.sessions.write().await;
    match sessions.remove(&id) {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(not_found(id)),
    }
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

fn not_found(id: Uuid) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("session not found: {}", id),
        }),
    )
}
