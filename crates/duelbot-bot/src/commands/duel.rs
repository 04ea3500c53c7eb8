//! `!duel`: challenge chat, or accept the open challenge.

use async_trait::async_trait;
use duelbot_core::error::DomainError;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// `!duel`
#[derive(Debug)]
pub struct Duel;

#[async_trait]
impl CommandHandler for Duel {
    async fn handle(
        &self,
        state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        state.duels.request_duel(invocation.username()).await
    }
}
