//! Progression repository abstraction.

use async_trait::async_trait;
use duelbot_core::error::DomainError;

use crate::domain::model::{DuelSettlement, StatSpend, StatType, User, UserResult, UserStat, Verdict};

/// Transactional store for identity, duel results and bounded stats.
///
/// Every multi-step operation is atomic: all of its reads and writes run in
/// one transaction, and a failure leaves nothing behind.
#[async_trait]
pub trait ProgressionRepository: Send + Sync {
    /// Idempotent get-or-insert; returns the user id.
    async fn ensure_user(&self, username: &str) -> Result<i64, DomainError>;

    /// Looks a user up without creating it.
    async fn get_user(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Duel counters for a user, `None` if the user has never dueled.
    async fn get_user_results(&self, username: &str) -> Result<Option<UserResult>, DomainError>;

    /// Counts a duel for both participants and awards any free points earned.
    ///
    /// Both participants are created (with default stats) if needed.
    async fn record_duel_result(
        &self,
        initiator: &str,
        challenger: &str,
        verdict: Verdict,
    ) -> Result<DuelSettlement, DomainError>;

    /// Returns every stat row for the user, seeding missing rows at their
    /// catalog defaults first. Idempotent.
    async fn get_or_create_stats(&self, username: &str) -> Result<Vec<UserStat>, DomainError>;

    /// Spends up to `amount` free points raising `stat_name`, debiting only
    /// what the clamp to the stat's max lets through.
    async fn spend_free_points(
        &self,
        username: &str,
        stat_name: &str,
        amount: i32,
    ) -> Result<StatSpend, DomainError>;

    /// The stat catalog, in catalog order.
    async fn stat_types(&self) -> Result<Vec<StatType>, DomainError>;
}
