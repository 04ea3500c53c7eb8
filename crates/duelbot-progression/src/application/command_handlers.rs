//! Command handlers for the Progression context.
//!
//! Thin orchestration over the repository: each handler validates what can
//! be validated without I/O, runs the repository operation, and logs the
//! result against the command's correlation id.

use duelbot_core::command::Command;
use duelbot_core::error::DomainError;
use tracing::{info, instrument, warn};

use crate::domain::commands::{RecordDuelResult, ShowStats, SpendFreePoints};
use crate::domain::model::{DuelSettlement, StatSheet, StatSpend};
use crate::domain::rules;
use crate::repository::ProgressionRepository;

/// Handles the `RecordDuelResult` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` if a user would duel themself, or
/// whatever the repository reports.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id(), verdict = ?command.verdict))]
pub async fn handle_record_duel_result(
    command: &RecordDuelResult,
    repo: &dyn ProgressionRepository,
) -> Result<DuelSettlement, DomainError> {
    if command.initiator == command.challenger {
        return Err(DomainError::Validation(
            "a user cannot duel themself".to_owned(),
        ));
    }

    let settlement = repo
        .record_duel_result(&command.initiator, &command.challenger, command.verdict)
        .await?;

    for (username, side) in [
        (&command.initiator, &settlement.initiator),
        (&command.challenger, &settlement.challenger),
    ] {
        if side.free_point_awarded {
            info!(%username, wins = side.wins, draws = side.draws, "free point awarded");
        }
    }
    info!(command_type = command.command_type(), "duel result recorded");

    Ok(settlement)
}

/// Handles the `SpendFreePoints` command.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a bad amount or target, and the
/// repository's `UnknownStat`, `UserNotFound`, `InsufficientFreePoints` or
/// `Persistence` errors.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id(), username = %command.username, stat = %command.stat_name))]
pub async fn handle_spend_free_points(
    command: &SpendFreePoints,
    repo: &dyn ProgressionRepository,
) -> Result<StatSpend, DomainError> {
    rules::validate_spend_request(&command.stat_name, command.amount)?;

    let spend = repo
        .spend_free_points(&command.username, &command.stat_name, command.amount)
        .await?;

    if spend.consumed < command.amount {
        warn!(
            requested = command.amount,
            consumed = spend.consumed,
            "spend clamped at stat max"
        );
    }
    info!(
        new_value = spend.new_value,
        free_points_left = spend.free_points_left,
        "free points spent"
    );

    Ok(spend)
}

/// Handles the `ShowStats` command: ensures the user's rows exist and
/// gathers stats and duel counters.
///
/// # Errors
///
/// Returns `DomainError::Persistence` if the repository fails.
#[instrument(skip_all, fields(correlation_id = %command.correlation_id(), username = %command.username))]
pub async fn handle_show_stats(
    command: &ShowStats,
    repo: &dyn ProgressionRepository,
) -> Result<StatSheet, DomainError> {
    let stats = repo.get_or_create_stats(&command.username).await?;
    let results = repo.get_user_results(&command.username).await?;

    Ok(StatSheet {
        username: command.username.clone(),
        stats,
        results,
    })
}
