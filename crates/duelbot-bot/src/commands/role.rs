//! `!role`: the caller's channel roles, read from chat badges.

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use duelbot_core::transport::ChatMessage;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// Roles carried by `message`'s author. A broadcaster is also a moderator.
#[must_use]
pub fn roles_of(message: &ChatMessage) -> Vec<&'static str> {
    let broadcaster = message.has_badge("broadcaster");
    let mut roles = Vec::new();
    if broadcaster {
        roles.push("broadcaster");
    }
    if broadcaster || message.has_badge("moderator") {
        roles.push("moderator");
    }
    if message.has_badge("subscriber") {
        roles.push("subscriber");
    }
    roles
}

fn describe(username: &str, roles: &[&str]) -> String {
    match roles {
        [] => format!("{username} has no special roles in this channel."),
        [only] => format!("User {username} is: {only}."),
        [first, second] => format!("User {username} is: {first} and {second}."),
        [init @ .., last] => format!("User {username} is: {}, and {last}.", init.join(", ")),
    }
}

/// `!role`
#[derive(Debug)]
pub struct Role;

#[async_trait]
impl CommandHandler for Role {
    async fn handle(
        &self,
        _state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        Ok(vec![describe(
            invocation.username(),
            &roles_of(invocation.message),
        )])
    }
}
