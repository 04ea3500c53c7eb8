//! Free-point and stat-spend rules.
//!
//! Pure functions shared by every `ProgressionRepository` implementation.
//! All arithmetic is on non-negative integers with floor division.

use duelbot_core::error::DomainError;

use super::model::{SideOutcome, StatType};

/// Spendable currency stat.
pub const FREE_POINTS: &str = "free-points";

/// Monotonic counter of every free point ever earned.
pub const TOTAL_FREE_POINTS: &str = "total-free-points";

/// Wins needed per free point before any tier growth.
pub const BASE_WIN_THRESHOLD: i32 = 10;

/// Draws needed per free point before any tier growth.
pub const BASE_DRAW_THRESHOLD: i32 = 20;

/// Earned free points per threshold tier.
pub const POINTS_PER_TIER: i32 = 5;

/// Returns `true` for stats that are currency rather than spend targets.
#[must_use]
pub fn is_currency_stat(name: &str) -> bool {
    name == FREE_POINTS || name == TOTAL_FREE_POINTS
}

/// Wins per free point at the given lifetime total:
/// `10 + 10 * floor(total / 5)`.
#[must_use]
pub fn win_threshold(total_free_points: i32) -> i32 {
    BASE_WIN_THRESHOLD + BASE_WIN_THRESHOLD * tier(total_free_points)
}

/// Draws per free point at the given lifetime total:
/// `20 + 20 * floor(total / 5)`.
#[must_use]
pub fn draw_threshold(total_free_points: i32) -> i32 {
    BASE_DRAW_THRESHOLD + BASE_DRAW_THRESHOLD * tier(total_free_points)
}

fn tier(total_free_points: i32) -> i32 {
    total_free_points.max(0) / POINTS_PER_TIER
}

/// Decides whether a duel earns one free point.
///
/// `wins` and `draws` are the counters *after* this duel was counted;
/// `total_free_points` is the lifetime total *before* any award. Losses
/// never earn.
#[must_use]
pub fn earns_free_point(outcome: SideOutcome, wins: i32, draws: i32, total_free_points: i32) -> bool {
    match outcome {
        SideOutcome::Win => wins > 0 && wins % win_threshold(total_free_points) == 0,
        SideOutcome::Draw => draws > 0 && draws % draw_threshold(total_free_points) == 0,
        SideOutcome::Lose => false,
    }
}

/// Rejects spend requests that are wrong before any lookup happens.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a non-positive amount or a
/// currency stat as the target.
pub fn validate_spend_request(stat_name: &str, amount: i32) -> Result<(), DomainError> {
    if amount <= 0 {
        return Err(DomainError::Validation(
            "amount must be greater than 0".to_owned(),
        ));
    }
    if is_currency_stat(stat_name) {
        return Err(DomainError::Validation(format!(
            "can't increase {stat_name} this way"
        )));
    }
    Ok(())
}

/// The writes a validated spend will perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendPlan {
    /// Stat value to store.
    pub new_value: i32,
    /// Free points to debit (`new_value - current`).
    pub consumed: i32,
    /// Balance to store after the debit.
    pub balance_after: i32,
}

/// Plans a spend of `requested` free points on `stat`.
///
/// The balance is checked against the requested amount up front; the
/// stat is then clamped to its max and only the points actually used are
/// debited.
///
/// # Errors
///
/// Returns `DomainError::InsufficientFreePoints` if `balance < requested`.
pub fn plan_spend(
    stat: &StatType,
    current: i32,
    balance: i32,
    requested: i32,
) -> Result<SpendPlan, DomainError> {
    if balance < requested {
        return Err(DomainError::InsufficientFreePoints { balance, requested });
    }
    let new_value = stat.clamp(current.saturating_add(requested));
    let consumed = (new_value - current).max(0);
    Ok(SpendPlan {
        new_value,
        consumed,
        balance_after: balance - consumed,
    })
}
