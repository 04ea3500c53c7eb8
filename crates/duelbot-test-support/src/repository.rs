//! Test repositories — `ProgressionRepository` doubles for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duelbot_core::clock::Clock;
use duelbot_core::error::DomainError;
use duelbot_progression::domain::model::{
    DuelSettlement, SideOutcome, SideSettlement, StatSpend, StatType, User, UserResult, UserStat,
    Verdict,
};
use duelbot_progression::domain::rules::{self, FREE_POINTS, TOTAL_FREE_POINTS};
use duelbot_progression::repository::ProgressionRepository;

use crate::clock::fixed_clock;

/// The stat catalog seeded by the initial migration.
#[must_use]
pub fn default_catalog() -> Vec<StatType> {
    let bounded = |id: i32, name: &str| StatType {
        id,
        name: name.to_owned(),
        min_value: 1,
        max_value: 100,
        default_value: 1,
    };
    let currency = |id: i32, name: &str| StatType {
        id,
        name: name.to_owned(),
        min_value: 0,
        max_value: 1_000_000,
        default_value: 0,
    };
    vec![
        bounded(1, "strength"),
        bounded(2, "agility"),
        bounded(3, "intelligence"),
        bounded(4, "luck"),
        currency(5, FREE_POINTS),
        currency(6, TOTAL_FREE_POINTS),
    ]
}

#[derive(Debug, Default)]
struct Ledger {
    next_user_id: i64,
    users: BTreeMap<String, User>,
    results: BTreeMap<i64, UserResult>,
    stats: BTreeMap<(i64, i32), (i32, DateTime<Utc>)>,
}

/// An in-memory repository applying the same rules as the PostgreSQL store.
///
/// Every operation runs under one mutex, which gives it the atomicity a
/// transaction gives the real store. Validation happens before any write so
/// failed operations leave the ledger untouched.
pub struct InMemoryProgressionRepository {
    catalog: Vec<StatType>,
    clock: Box<dyn Clock>,
    ledger: Mutex<Ledger>,
}

impl std::fmt::Debug for InMemoryProgressionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryProgressionRepository")
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryProgressionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProgressionRepository {
    /// Creates an empty repository over [`default_catalog`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(default_catalog())
    }

    /// Creates an empty repository over a custom catalog.
    #[must_use]
    pub fn with_catalog(catalog: Vec<StatType>) -> Self {
        Self {
            catalog,
            clock: Box::new(fixed_clock()),
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Test setup: creates the user if needed and forces a stat value,
    /// bypassing the rules.
    ///
    /// # Panics
    ///
    /// Panics if `stat_name` is not in the catalog.
    pub fn seed_stat(&self, username: &str, stat_name: &str, value: i32) {
        let stat = self
            .find_stat(stat_name)
            .unwrap_or_else(|| panic!("seed_stat: unknown stat {stat_name}"))
            .clone();
        let now = self.clock.now();
        let mut ledger = self.ledger.lock().unwrap();
        let user_id = self.ensure_user_locked(&mut ledger, username);
        self.seed_defaults_locked(&mut ledger, user_id);
        ledger.stats.insert((user_id, stat.id), (value, now));
    }

    /// Test inspection: a stat value without seeding anything.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stat_value(&self, username: &str, stat_name: &str) -> Option<i32> {
        let stat = self.find_stat(stat_name)?;
        let ledger = self.ledger.lock().unwrap();
        let user_id = ledger.users.get(username)?.id;
        ledger.stats.get(&(user_id, stat.id)).map(|(value, _)| *value)
    }

    /// Test inspection: number of stat rows stored for a user.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stat_row_count(&self, username: &str) -> usize {
        let ledger = self.ledger.lock().unwrap();
        let Some(user) = ledger.users.get(username) else {
            return 0;
        };
        ledger.stats.keys().filter(|(id, _)| *id == user.id).count()
    }

    fn find_stat(&self, name: &str) -> Option<&StatType> {
        self.catalog.iter().find(|stat| stat.name == name)
    }

    fn require_stat(&self, name: &str) -> Result<&StatType, DomainError> {
        self.find_stat(name)
            .ok_or_else(|| DomainError::Configuration(format!("catalog has no {name} stat")))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Ledger>, DomainError> {
        self.ledger
            .lock()
            .map_err(|e| DomainError::Persistence(format!("ledger mutex poisoned: {e}")))
    }

    fn ensure_user_locked(&self, ledger: &mut Ledger, username: &str) -> i64 {
        if let Some(user) = ledger.users.get(username) {
            return user.id;
        }
        ledger.next_user_id += 1;
        let now = self.clock.now();
        let user = User {
            id: ledger.next_user_id,
            username: username.to_owned(),
            created_at: now,
            updated_at: now,
        };
        let id = user.id;
        ledger.users.insert(username.to_owned(), user);
        id
    }

    fn seed_defaults_locked(&self, ledger: &mut Ledger, user_id: i64) {
        let now = self.clock.now();
        for stat in &self.catalog {
            ledger
                .stats
                .entry((user_id, stat.id))
                .or_insert((stat.default_value, now));
        }
    }

    fn value_locked(ledger: &Ledger, user_id: i64, stat: &StatType) -> i32 {
        ledger
            .stats
            .get(&(user_id, stat.id))
            .map_or(stat.default_value, |(value, _)| *value)
    }

    fn settle_side_locked(
        &self,
        ledger: &mut Ledger,
        user_id: i64,
        outcome: SideOutcome,
        free_points: &StatType,
        total_free_points: &StatType,
    ) -> SideSettlement {
        let now = self.clock.now();
        let (wins, draws, loses) = outcome.deltas();
        let result = ledger.results.entry(user_id).or_insert(UserResult {
            user_id,
            wins: 0,
            draws: 0,
            loses: 0,
            updated_at: now,
        });
        result.wins += wins;
        result.draws += draws;
        result.loses += loses;
        result.updated_at = now;
        let (wins, draws, loses) = (result.wins, result.draws, result.loses);

        let total = Self::value_locked(ledger, user_id, total_free_points);
        let awarded = rules::earns_free_point(outcome, wins, draws, total);
        if awarded {
            for stat in [free_points, total_free_points] {
                let value = Self::value_locked(ledger, user_id, stat);
                ledger
                    .stats
                    .insert((user_id, stat.id), (stat.clamp(value + 1), now));
            }
        }

        SideSettlement {
            user_id,
            outcome,
            wins,
            draws,
            loses,
            free_point_awarded: awarded,
        }
    }

    fn stats_locked(&self, ledger: &Ledger, user_id: i64) -> Vec<UserStat> {
        self.catalog
            .iter()
            .filter_map(|stat| {
                ledger
                    .stats
                    .get(&(user_id, stat.id))
                    .map(|(value, updated_at)| UserStat {
                        user_id,
                        stat_type_id: stat.id,
                        name: stat.name.clone(),
                        value: *value,
                        updated_at: *updated_at,
                    })
            })
            .collect()
    }
}

#[async_trait]
impl ProgressionRepository for InMemoryProgressionRepository {
    async fn ensure_user(&self, username: &str) -> Result<i64, DomainError> {
        let mut ledger = self.lock()?;
        Ok(self.ensure_user_locked(&mut ledger, username))
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.lock()?.users.get(username).cloned())
    }

    async fn get_user_results(&self, username: &str) -> Result<Option<UserResult>, DomainError> {
        let ledger = self.lock()?;
        Ok(ledger
            .users
            .get(username)
            .and_then(|user| ledger.results.get(&user.id))
            .cloned())
    }

    async fn record_duel_result(
        &self,
        initiator: &str,
        challenger: &str,
        verdict: Verdict,
    ) -> Result<DuelSettlement, DomainError> {
        if initiator == challenger {
            return Err(DomainError::Validation(
                "a user cannot duel themself".to_owned(),
            ));
        }
        let free_points = self.require_stat(FREE_POINTS)?;
        let total_free_points = self.require_stat(TOTAL_FREE_POINTS)?;

        let mut ledger = self.lock()?;
        let initiator_id = self.ensure_user_locked(&mut ledger, initiator);
        let challenger_id = self.ensure_user_locked(&mut ledger, challenger);
        self.seed_defaults_locked(&mut ledger, initiator_id);
        self.seed_defaults_locked(&mut ledger, challenger_id);

        let (initiator_outcome, challenger_outcome) = verdict.sides();
        let initiator = self.settle_side_locked(
            &mut ledger,
            initiator_id,
            initiator_outcome,
            free_points,
            total_free_points,
        );
        let challenger = self.settle_side_locked(
            &mut ledger,
            challenger_id,
            challenger_outcome,
            free_points,
            total_free_points,
        );

        Ok(DuelSettlement {
            initiator,
            challenger,
        })
    }

    async fn get_or_create_stats(&self, username: &str) -> Result<Vec<UserStat>, DomainError> {
        let mut ledger = self.lock()?;
        let user_id = self.ensure_user_locked(&mut ledger, username);
        self.seed_defaults_locked(&mut ledger, user_id);
        Ok(self.stats_locked(&ledger, user_id))
    }

    async fn spend_free_points(
        &self,
        username: &str,
        stat_name: &str,
        amount: i32,
    ) -> Result<StatSpend, DomainError> {
        rules::validate_spend_request(stat_name, amount)?;
        let stat = self
            .find_stat(stat_name)
            .ok_or_else(|| DomainError::UnknownStat(stat_name.to_owned()))?;
        let free_points = self.require_stat(FREE_POINTS)?;

        let mut ledger = self.lock()?;
        let user_id = ledger
            .users
            .get(username)
            .map(|user| user.id)
            .ok_or_else(|| DomainError::UserNotFound(username.to_owned()))?;
        self.seed_defaults_locked(&mut ledger, user_id);

        let current = Self::value_locked(&ledger, user_id, stat);
        let balance = Self::value_locked(&ledger, user_id, free_points);
        let plan = rules::plan_spend(stat, current, balance, amount)?;

        let now = self.clock.now();
        ledger.stats.insert((user_id, stat.id), (plan.new_value, now));
        ledger
            .stats
            .insert((user_id, free_points.id), (plan.balance_after, now));

        Ok(StatSpend {
            stat_name: stat.name.clone(),
            previous_value: current,
            new_value: plan.new_value,
            consumed: plan.consumed,
            free_points_left: plan.balance_after,
        })
    }

    async fn stat_types(&self) -> Result<Vec<StatType>, DomainError> {
        Ok(self.catalog.clone())
    }
}

/// A repository that always returns a persistence error. Useful for testing
/// fail-closed paths.
#[derive(Debug)]
pub struct FailingProgressionRepository;

fn refused() -> DomainError {
    DomainError::Persistence("connection refused".into())
}

#[async_trait]
impl ProgressionRepository for FailingProgressionRepository {
    async fn ensure_user(&self, _username: &str) -> Result<i64, DomainError> {
        Err(refused())
    }

    async fn get_user(&self, _username: &str) -> Result<Option<User>, DomainError> {
        Err(refused())
    }

    async fn get_user_results(&self, _username: &str) -> Result<Option<UserResult>, DomainError> {
        Err(refused())
    }

    async fn record_duel_result(
        &self,
        _initiator: &str,
        _challenger: &str,
        _verdict: Verdict,
    ) -> Result<DuelSettlement, DomainError> {
        Err(refused())
    }

    async fn get_or_create_stats(&self, _username: &str) -> Result<Vec<UserStat>, DomainError> {
        Err(refused())
    }

    async fn spend_free_points(
        &self,
        _username: &str,
        _stat_name: &str,
        _amount: i32,
    ) -> Result<StatSpend, DomainError> {
        Err(refused())
    }

    async fn stat_types(&self) -> Result<Vec<StatType>, DomainError> {
        Err(refused())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_stats_twice_returns_identical_rows() {
        let repo = InMemoryProgressionRepository::new();

        let first = repo.get_or_create_stats("newcomer").await.unwrap();
        let second = repo.get_or_create_stats("newcomer").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), default_catalog().len());
        assert_eq!(repo.stat_row_count("newcomer"), default_catalog().len());
    }

    #[tokio::test]
    async fn test_spend_for_unknown_user_is_user_not_found() {
        let repo = InMemoryProgressionRepository::new();
        let err = repo.spend_free_points("ghost", "strength", 1).await.unwrap_err();
        assert!(matches!(err, DomainError::UserNotFound(name) if name == "ghost"));
    }
}
