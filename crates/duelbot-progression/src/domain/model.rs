//! Progression data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chat user known to the progression ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Row identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// When the user was first seen.
    pub created_at: DateTime<Utc>,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

/// Lifetime duel counters for one user. Counters never decrease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserResult {
    /// Owning user.
    pub user_id: i64,
    /// Duels won.
    pub wins: i32,
    /// Duels drawn.
    pub draws: i32,
    /// Duels lost.
    pub loses: i32,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

/// A catalog entry describing a bounded stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatType {
    /// Catalog identifier.
    pub id: i32,
    /// Machine name, e.g. `strength` or `free-points`.
    pub name: String,
    /// Inclusive lower bound.
    pub min_value: i32,
    /// Inclusive upper bound.
    pub max_value: i32,
    /// Value a new user starts with.
    pub default_value: i32,
}

impl StatType {
    /// Clamps `value` into `[min_value, max_value]`.
    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min_value, self.max_value)
    }
}

/// One user's value for one catalog stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStat {
    /// Owning user.
    pub user_id: i64,
    /// Catalog identifier of the stat.
    pub stat_type_id: i32,
    /// Catalog name of the stat (denormalized for display).
    pub name: String,
    /// Current value, always inside the catalog bounds.
    pub value: i32,
    /// Last modification.
    pub updated_at: DateTime<Utc>,
}

/// Outcome of a resolved duel, from the initiator's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The user who issued the challenge won.
    InitiatorWins,
    /// The user who accepted the challenge won.
    ChallengerWins,
    /// Neither side won.
    Draw,
}

impl Verdict {
    /// Splits the verdict into `(initiator, challenger)` side outcomes.
    #[must_use]
    pub fn sides(self) -> (SideOutcome, SideOutcome) {
        match self {
            Self::InitiatorWins => (SideOutcome::Win, SideOutcome::Lose),
            Self::ChallengerWins => (SideOutcome::Lose, SideOutcome::Win),
            Self::Draw => (SideOutcome::Draw, SideOutcome::Draw),
        }
    }
}

/// Outcome of a duel for a single participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideOutcome {
    /// Participant won.
    Win,
    /// Participant drew.
    Draw,
    /// Participant lost.
    Lose,
}

impl SideOutcome {
    /// Counter deltas `(wins, draws, loses)` for this outcome.
    #[must_use]
    pub fn deltas(self) -> (i32, i32, i32) {
        match self {
            Self::Win => (1, 0, 0),
            Self::Draw => (0, 1, 0),
            Self::Lose => (0, 0, 1),
        }
    }
}

/// What a recorded duel did to one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSettlement {
    /// Participant's user id.
    pub user_id: i64,
    /// Participant's outcome.
    pub outcome: SideOutcome,
    /// Counter values after the update.
    pub wins: i32,
    /// Counter values after the update.
    pub draws: i32,
    /// Counter values after the update.
    pub loses: i32,
    /// Whether this duel earned the participant a free point.
    pub free_point_awarded: bool,
}

/// Result of `record_duel_result` for both participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuelSettlement {
    /// The user who issued the challenge.
    pub initiator: SideSettlement,
    /// The user who accepted it.
    pub challenger: SideSettlement,
}

/// Result of a successful free-point spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatSpend {
    /// Catalog name of the raised stat.
    pub stat_name: String,
    /// Value before the spend.
    pub previous_value: i32,
    /// Value after the spend (clamped to the catalog max).
    pub new_value: i32,
    /// Free points actually debited.
    pub consumed: i32,
    /// Spendable balance after the debit.
    pub free_points_left: i32,
}

/// Everything `!stats` shows for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatSheet {
    /// The user the sheet belongs to.
    pub username: String,
    /// All stat rows, in catalog order.
    pub stats: Vec<UserStat>,
    /// Duel counters, if the user has ever dueled.
    pub results: Option<UserResult>,
}
