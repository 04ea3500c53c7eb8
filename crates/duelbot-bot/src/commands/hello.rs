//! `!hello`: a greeting in a random language.

use std::sync::PoisonError;

use async_trait::async_trait;
use duelbot_core::error::DomainError;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// `!hello`
#[derive(Debug)]
pub struct Hello;

#[async_trait]
impl CommandHandler for Hello {
    async fn handle(
        &self,
        state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        let index = state
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pick_index(state.greetings.len())
            .ok_or_else(|| DomainError::Configuration("no greetings configured".to_owned()))?;
        let greeting = &state.greetings[index];
        Ok(vec![format!(
            "@{}, {} * means 'hello' in {} *",
            invocation.username(),
            greeting.text,
            greeting.language
        )])
    }
}
