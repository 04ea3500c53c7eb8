//! HTTP routes of the chat bridge.

pub mod chat;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// The full HTTP router, shared by `main` and the integration tests.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/chat", chat::router())
        .with_state(state)
}
