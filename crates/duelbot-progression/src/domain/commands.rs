//! Commands for the Progression context.

use duelbot_core::command::Command;
use uuid::Uuid;

use super::model::Verdict;

/// Command to record a resolved duel for both participants.
#[derive(Debug, Clone)]
pub struct RecordDuelResult {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user who issued the challenge.
    pub initiator: String,
    /// The user who accepted it.
    pub challenger: String,
    /// How the duel ended.
    pub verdict: Verdict,
}

impl Command for RecordDuelResult {
    fn command_type(&self) -> &'static str {
        "progression.record_duel_result"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn username(&self) -> &str {
        &self.challenger
    }
}

/// Command to spend free points on a stat.
#[derive(Debug, Clone)]
pub struct SpendFreePoints {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The spending user.
    pub username: String,
    /// Catalog name of the stat to raise.
    pub stat_name: String,
    /// Points requested.
    pub amount: i32,
}

impl Command for SpendFreePoints {
    fn command_type(&self) -> &'static str {
        "progression.spend_free_points"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn username(&self) -> &str {
        &self.username
    }
}

/// Command to load (creating on first use) a user's stat sheet.
#[derive(Debug, Clone)]
pub struct ShowStats {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The user whose sheet is shown.
    pub username: String,
}

impl Command for ShowStats {
    fn command_type(&self) -> &'static str {
        "progression.show_stats"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn username(&self) -> &str {
        &self.username
    }
}
