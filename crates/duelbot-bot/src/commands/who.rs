//! `!who`: streamers taking part tonight.

use async_trait::async_trait;
use duelbot_core::error::DomainError;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// `!who`
#[derive(Debug)]
pub struct Who;

#[async_trait]
impl CommandHandler for Who {
    async fn handle(
        &self,
        state: &BotState,
        _invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        if state.friends.is_empty() {
            return Ok(vec!["Nobody else is streaming with us tonight.".to_owned()]);
        }
        Ok(vec![format!(
            "Our friends (for tonight): {}",
            state.friends.join(" | ")
        )])
    }
}
