//! Health check endpoint.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use duelbot_duel::domain::arena::DuelPhase;
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
    /// Channel the bot serves.
    pub channel: String,
    /// Current duel arena phase.
    pub duel_phase: &'static str,
}

fn phase_name(phase: DuelPhase) -> &'static str {
    match phase {
        DuelPhase::Idle => "idle",
        DuelPhase::Pending => "pending",
        DuelPhase::Settling => "settling",
        DuelPhase::Cooldown => "cooldown",
    }
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        channel: state.channel.clone(),
        duel_phase: phase_name(state.duels.phase()),
    })
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
