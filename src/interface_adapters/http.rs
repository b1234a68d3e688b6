// HTTP routes beside the game hub and shared JSON response types.

use crate::domain::SessionPhase;
use crate::interface_adapters::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    // Human-readable error string for consistent JSON error responses.
    pub error: String,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub phase: &'static str,
    // Players in the roster.
    pub players: usize,
    // Open sockets, joined or not.
    pub connections: usize,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.coordinator.snapshot().await;
    let connections = state.hub().connection_count().await;

    let phase = match snapshot.phase {
        SessionPhase::Lobby => "Lobby",
        SessionPhase::InProgress => "InProgress",
    };

    Json(HealthResponse {
        status: "ok",
        phase,
        players: snapshot.players.len(),
        connections,
    })
}

pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "not found".to_string(),
        }),
    )
}
