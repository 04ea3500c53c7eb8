//! `!title` and `!game`: read-only stream metadata.

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use tracing::warn;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// `!title`
#[derive(Debug)]
pub struct Title;

#[async_trait]
impl CommandHandler for Title {
    async fn handle(
        &self,
        state: &BotState,
        _invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        let reply = match state.metadata.title(&state.channel).await {
            Ok(title) => title,
            Err(e) => {
                warn!(error = %e, "stream title lookup failed");
                "The stream title is unavailable right now.".to_owned()
            }
        };
        Ok(vec![reply])
    }
}

/// `!game`
#[derive(Debug)]
pub struct Game;

#[async_trait]
impl CommandHandler for Game {
    async fn handle(
        &self,
        state: &BotState,
        _invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        let reply = match state.metadata.current_game(&state.channel).await {
            Ok(game) => format!("Current game is: {game}"),
            Err(e) => {
                warn!(error = %e, "current game lookup failed");
                "The current game is unavailable right now.".to_owned()
            }
        };
        Ok(vec![reply])
    }
}
