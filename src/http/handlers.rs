use super::state::AppState;
use crate::session::SessionState;
use crate::transcript::TranscriptEntry;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub state: SessionState,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub state: SessionState,
    pub transcript_entries: usize,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    pub entries: Vec<TranscriptEntry>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /session/start
/// Start the voice session (no-op if already underway)
pub async fn start_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Start requested for session {}", state.controller.session_id());

    match state.controller.start().await {
        Ok(()) => (
            StatusCode::OK,
            Json(SessionResponse {
                session_id: state.controller.session_id().to_string(),
                state: state.controller.state().await,
                message: "Session started".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start session: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /session/stop
/// Stop the voice session; always succeeds, transcript stays readable
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    info!("Stop requested for session {}", state.controller.session_id());

    state.controller.stop().await;

    (
        StatusCode::OK,
        Json(SessionResponse {
            session_id: state.controller.session_id().to_string(),
            state: state.controller.state().await,
            message: "Session stopped".to_string(),
        }),
    )
}

/// GET /session/status
pub async fn get_session_status(State(state): State<AppState>) -> impl IntoResponse {
    let transcript_entries = state.controller.transcript().len().await;

    (
        StatusCode::OK,
        Json(SessionStatusResponse {
            session_id: state.controller.session_id().to_string(),
            state: state.controller.state().await,
            transcript_entries,
        }),
    )
}

/// GET /session/transcript
pub async fn get_session_transcript(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(TranscriptResponse {
            session_id: state.controller.session_id().to_string(),
            entries: state.controller.transcript_entries().await,
        }),
    )
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
