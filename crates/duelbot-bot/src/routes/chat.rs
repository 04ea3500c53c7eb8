//! Chat bridge: inbound lines in, buffered replies out.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use duelbot_core::error::DomainError;
use duelbot_core::transport::ChatMessage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::outbox::OutboundMessage;
use crate::state::AppState;

/// Body of `POST /api/v1/chat/messages`.
#[derive(Debug, Deserialize)]
pub struct InboundMessageRequest {
    /// Channel the line was posted in; defaults to the bot's channel.
    #[serde(default)]
    pub channel: Option<String>,
    /// Author login name.
    pub username: String,
    /// Author badges.
    #[serde(default)]
    pub badges: HashMap<String, u32>,
    /// The chat line.
    pub text: String,
}

/// Response of `POST /api/v1/chat/messages`.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Correlation id the line is logged under.
    pub correlation_id: Uuid,
}

/// Response of `GET /api/v1/chat/outbox`.
#[derive(Debug, Serialize)]
pub struct OutboxResponse {
    /// Drained replies, oldest first.
    pub messages: Vec<OutboundMessage>,
}

/// POST /api/v1/chat/messages
async fn post_message(
    State(state): State<AppState>,
    Json(body): Json<InboundMessageRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    if body.username.trim().is_empty() {
        return Err(DomainError::Validation("username must not be empty".to_owned()).into());
    }
    if body.text.trim().is_empty() {
        return Err(DomainError::Validation("text must not be empty".to_owned()).into());
    }

    let message = ChatMessage {
        channel: body
            .channel
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| state.channel.clone()),
        username: body.username.trim().to_lowercase(),
        badges: body.badges,
        text: body.text,
    };
    let correlation_id = state.inbox.submit(message).await?;

    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { correlation_id })))
}

/// GET /api/v1/chat/outbox
async fn drain_outbox(State(state): State<AppState>) -> Json<OutboxResponse> {
    Json(OutboxResponse {
        messages: state.outbox.drain(),
    })
}

/// Returns the router for the chat bridge.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages", post(post_message))
        .route("/outbox", get(drain_outbox))
}
