//! `!up <stat> <amount>`: spend free points on a stat.

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use duelbot_progression::application::command_handlers::handle_spend_free_points;
use duelbot_progression::domain::commands::SpendFreePoints;
use duelbot_progression::domain::rules;
use uuid::Uuid;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// Parses `!up` arguments into `(stat, amount)`.
///
/// # Errors
///
/// Returns `DomainError::Validation` unless there are exactly two
/// arguments, the amount is a positive integer, and the stat is not a
/// currency stat.
pub fn parse_args(args: &[String]) -> Result<(String, i32), DomainError> {
    let [stat, amount] = args else {
        return Err(DomainError::Validation(
            "usage: !up <stat> <amount>, e.g. !up strength 2".to_owned(),
        ));
    };
    let amount: i32 = amount.parse().map_err(|_| {
        DomainError::Validation(format!("the amount must be a whole number, got {amount}"))
    })?;
    rules::validate_spend_request(stat, amount)?;
    Ok((stat.clone(), amount))
}

/// `!up`
#[derive(Debug)]
pub struct Up;

#[async_trait]
impl CommandHandler for Up {
    async fn handle(
        &self,
        state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        let (stat_name, amount) = parse_args(&invocation.args)?;
        let command = SpendFreePoints {
            correlation_id: Uuid::new_v4(),
            username: invocation.username().to_owned(),
            stat_name,
            amount,
        };
        let spend = handle_spend_free_points(&command, state.progression.as_ref()).await?;
        let label = state.labels.label(&spend.stat_name).unwrap_or(&spend.stat_name);
        Ok(vec![format!(
            "{}'s {label} is now {} ({} free points spent, {} left).",
            invocation.username(),
            spend.new_value,
            spend.consumed,
            spend.free_points_left
        )])
    }
}
