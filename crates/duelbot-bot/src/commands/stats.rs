//! `!stats`: the caller's stat sheet and duel record.

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use duelbot_progression::application::command_handlers::handle_show_stats;
use duelbot_progression::domain::commands::ShowStats;
use duelbot_progression::domain::labels::StatLabels;
use duelbot_progression::domain::model::StatSheet;
use uuid::Uuid;

use crate::router::{CommandHandler, Invocation};
use crate::state::BotState;

/// Renders a sheet as one chat line.
#[must_use]
pub fn render_sheet(sheet: &StatSheet, labels: &StatLabels) -> String {
    let mut parts: Vec<String> = sheet
        .stats
        .iter()
        .map(|stat| format!("{}: {}", labels.label(&stat.name).unwrap_or(&stat.name), stat.value))
        .collect();
    let (wins, draws, loses) = sheet
        .results
        .as_ref()
        .map_or((0, 0, 0), |r| (r.wins, r.draws, r.loses));
    parts.push(format!("W/D/L: {wins}/{draws}/{loses}"));
    format!("{}'s stats: {}", sheet.username, parts.join(" | "))
}

/// `!stats`
#[derive(Debug)]
pub struct Stats;

#[async_trait]
impl CommandHandler for Stats {
    async fn handle(
        &self,
        state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError> {
        let command = ShowStats {
            correlation_id: Uuid::new_v4(),
            username: invocation.username().to_owned(),
        };
        let sheet = handle_show_stats(&command, state.progression.as_ref()).await?;
        Ok(vec![render_sheet(&sheet, &state.labels)])
    }
}
