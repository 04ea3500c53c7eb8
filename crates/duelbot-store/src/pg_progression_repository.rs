//! `PostgreSQL` implementation of the `ProgressionRepository` trait.
//!
//! Every multi-step operation runs in one transaction; rows that are read
//! and then written are locked with `FOR UPDATE`. A transaction dropped on
//! an early return rolls back.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{info, instrument};

use duelbot_core::error::DomainError;
use duelbot_progression::domain::model::{
    DuelSettlement, SideOutcome, SideSettlement, StatSpend, StatType, User, UserResult, UserStat,
    Verdict,
};
use duelbot_progression::domain::rules::{self, FREE_POINTS, TOTAL_FREE_POINTS};
use duelbot_progression::repository::ProgressionRepository;

/// Deadline applied to every repository operation.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserResultRow {
    user_id: i64,
    wins: i32,
    draws: i32,
    loses: i32,
    updated_at: DateTime<Utc>,
}

impl From<UserResultRow> for UserResult {
    fn from(row: UserResultRow) -> Self {
        Self {
            user_id: row.user_id,
            wins: row.wins,
            draws: row.draws,
            loses: row.loses,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct StatTypeRow {
    id: i32,
    name: String,
    min_value: i32,
    max_value: i32,
    default_value: i32,
}

impl From<StatTypeRow> for StatType {
    fn from(row: StatTypeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            min_value: row.min_value,
            max_value: row.max_value,
            default_value: row.default_value,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserStatRow {
    user_id: i64,
    stat_type_id: i32,
    name: String,
    value: i32,
    updated_at: DateTime<Utc>,
}

impl From<UserStatRow> for UserStat {
    fn from(row: UserStatRow) -> Self {
        Self {
            user_id: row.user_id,
            stat_type_id: row.stat_type_id,
            name: row.name,
            value: row.value,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct CountersRow {
    wins: i32,
    draws: i32,
    loses: i32,
}

fn db_error(e: sqlx::Error) -> DomainError {
    DomainError::Persistence(e.to_string())
}

/// PostgreSQL-backed progression repository.
#[derive(Debug, Clone)]
pub struct PgProgressionRepository {
    pool: PgPool,
    deadline: Duration,
}

impl PgProgressionRepository {
    /// Creates a new `PgProgressionRepository` with the default deadline.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self::with_deadline(pool, DEFAULT_DEADLINE)
    }

    /// Creates a repository whose operations give up after `deadline`.
    #[must_use]
    pub fn with_deadline(pool: PgPool, deadline: Duration) -> Self {
        Self { pool, deadline }
    }

    async fn within<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        tokio::time::timeout(self.deadline, work)
            .await
            .map_err(|_| {
                DomainError::Persistence(format!(
                    "{operation} timed out after {}ms",
                    self.deadline.as_millis()
                ))
            })?
    }
}

async fn ensure_user_id(conn: &mut PgConnection, username: &str) -> Result<i64, DomainError> {
    sqlx::query_scalar(
        "INSERT INTO users (username) VALUES ($1)
         ON CONFLICT (username) DO UPDATE SET username = EXCLUDED.username
         RETURNING id",
    )
    .bind(username)
    .fetch_one(conn)
    .await
    .map_err(db_error)
}

async fn find_user_id(conn: &mut PgConnection, username: &str) -> Result<Option<i64>, DomainError> {
    sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(conn)
        .await
        .map_err(db_error)
}

async fn seed_default_stats(conn: &mut PgConnection, user_id: i64) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO user_stats (user_id, stat_type_id, value, updated_at)
         SELECT $1, id, default_value, NOW() FROM stat_types
         ON CONFLICT (user_id, stat_type_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn find_stat_type(conn: &mut PgConnection, name: &str) -> Result<Option<StatType>, DomainError> {
    let row: Option<StatTypeRow> = sqlx::query_as(
        "SELECT id, name, min_value, max_value, default_value FROM stat_types WHERE name = $1",
    )
    .bind(name)
    .fetch_optional(conn)
    .await
    .map_err(db_error)?;
    Ok(row.map(StatType::from))
}

async fn require_stat_type(conn: &mut PgConnection, name: &str) -> Result<StatType, DomainError> {
    find_stat_type(conn, name)
        .await?
        .ok_or_else(|| DomainError::Configuration(format!("catalog has no {name} stat")))
}

async fn lock_stat_value(
    conn: &mut PgConnection,
    user_id: i64,
    stat: &StatType,
) -> Result<i32, DomainError> {
    let value: Option<i32> = sqlx::query_scalar(
        "SELECT value FROM user_stats WHERE user_id = $1 AND stat_type_id = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(stat.id)
    .fetch_optional(conn)
    .await
    .map_err(db_error)?;
    Ok(value.unwrap_or(stat.default_value))
}

async fn store_stat_value(
    conn: &mut PgConnection,
    user_id: i64,
    stat: &StatType,
    value: i32,
) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO user_stats (user_id, stat_type_id, value, updated_at)
         VALUES ($1, $2, $3, NOW())
         ON CONFLICT (user_id, stat_type_id)
         DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
    )
    .bind(user_id)
    .bind(stat.id)
    .bind(value)
    .execute(conn)
    .await
    .map_err(db_error)?;
    Ok(())
}

async fn settle_side(
    conn: &mut PgConnection,
    user_id: i64,
    outcome: SideOutcome,
    free_points: &StatType,
    total_free_points: &StatType,
) -> Result<SideSettlement, DomainError> {
    let (wins, draws, loses) = outcome.deltas();
    let counters: CountersRow = sqlx::query_as(
        "INSERT INTO user_results (user_id, wins, draws, loses, updated_at)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT (user_id) DO UPDATE SET
             wins = user_results.wins + EXCLUDED.wins,
             draws = user_results.draws + EXCLUDED.draws,
             loses = user_results.loses + EXCLUDED.loses,
             updated_at = NOW()
         RETURNING wins, draws, loses",
    )
    .bind(user_id)
    .bind(wins)
    .bind(draws)
    .bind(loses)
    .fetch_one(&mut *conn)
    .await
    .map_err(db_error)?;

    let total = lock_stat_value(&mut *conn, user_id, total_free_points).await?;
    let awarded = rules::earns_free_point(outcome, counters.wins, counters.draws, total);
    if awarded {
        for stat in [free_points, total_free_points] {
            let value = lock_stat_value(&mut *conn, user_id, stat).await?;
            store_stat_value(&mut *conn, user_id, stat, stat.clamp(value.saturating_add(1))).await?;
        }
    }

    Ok(SideSettlement {
        user_id,
        outcome,
        wins: counters.wins,
        draws: counters.draws,
        loses: counters.loses,
        free_point_awarded: awarded,
    })
}

async fn load_stats(conn: &mut PgConnection, user_id: i64) -> Result<Vec<UserStat>, DomainError> {
    let rows: Vec<UserStatRow> = sqlx::query_as(
        "SELECT us.user_id, us.stat_type_id, st.name, us.value, us.updated_at
         FROM user_stats us
         JOIN stat_types st ON st.id = us.stat_type_id
         WHERE us.user_id = $1
         ORDER BY st.id",
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map_err(db_error)?;
    Ok(rows.into_iter().map(UserStat::from).collect())
}

#[async_trait]
impl ProgressionRepository for PgProgressionRepository {
    #[instrument(skip(self))]
    async fn ensure_user(&self, username: &str) -> Result<i64, DomainError> {
        self.within("ensure_user", async {
            let mut conn = self.pool.acquire().await.map_err(db_error)?;
            ensure_user_id(&mut conn, username).await
        })
        .await
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.within("get_user", async {
            let row: Option<UserRow> = sqlx::query_as(
                "SELECT id, username, created_at, updated_at FROM users WHERE username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
            Ok(row.map(User::from))
        })
        .await
    }

    async fn get_user_results(&self, username: &str) -> Result<Option<UserResult>, DomainError> {
        self.within("get_user_results", async {
            let row: Option<UserResultRow> = sqlx::query_as(
                "SELECT r.user_id, r.wins, r.draws, r.loses, r.updated_at
                 FROM user_results r
                 JOIN users u ON u.id = r.user_id
                 WHERE u.username = $1",
            )
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
            Ok(row.map(UserResult::from))
        })
        .await
    }

    #[instrument(skip(self))]
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

        self.within("record_duel_result", async {
            let mut tx = self.pool.begin().await.map_err(db_error)?;

            let free_points = require_stat_type(&mut tx, FREE_POINTS).await?;
            let total_free_points = require_stat_type(&mut tx, TOTAL_FREE_POINTS).await?;

            let initiator_id = ensure_user_id(&mut tx, initiator).await?;
            let challenger_id = ensure_user_id(&mut tx, challenger).await?;
            seed_default_stats(&mut tx, initiator_id).await?;
            seed_default_stats(&mut tx, challenger_id).await?;

            let (initiator_outcome, challenger_outcome) = verdict.sides();
            let initiator = settle_side(
                &mut tx,
                initiator_id,
                initiator_outcome,
                &free_points,
                &total_free_points,
            )
            .await?;
            let challenger = settle_side(
                &mut tx,
                challenger_id,
                challenger_outcome,
                &free_points,
                &total_free_points,
            )
            .await?;

            tx.commit().await.map_err(db_error)?;
            info!(initiator_id, challenger_id, "duel result committed");

            Ok(DuelSettlement {
                initiator,
                challenger,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    async fn get_or_create_stats(&self, username: &str) -> Result<Vec<UserStat>, DomainError> {
        self.within("get_or_create_stats", async {
            let mut tx = self.pool.begin().await.map_err(db_error)?;
            let user_id = ensure_user_id(&mut tx, username).await?;
            seed_default_stats(&mut tx, user_id).await?;
            let stats = load_stats(&mut tx, user_id).await?;
            tx.commit().await.map_err(db_error)?;
            Ok(stats)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn spend_free_points(
        &self,
        username: &str,
        stat_name: &str,
        amount: i32,
    ) -> Result<StatSpend, DomainError> {
        rules::validate_spend_request(stat_name, amount)?;

        self.within("spend_free_points", async {
            let mut tx = self.pool.begin().await.map_err(db_error)?;

            let stat = find_stat_type(&mut tx, stat_name)
                .await?
                .ok_or_else(|| DomainError::UnknownStat(stat_name.to_owned()))?;
            let free_points = require_stat_type(&mut tx, FREE_POINTS).await?;
            let user_id = find_user_id(&mut tx, username)
                .await?
                .ok_or_else(|| DomainError::UserNotFound(username.to_owned()))?;
            seed_default_stats(&mut tx, user_id).await?;

            let current = lock_stat_value(&mut tx, user_id, &stat).await?;
            let balance = lock_stat_value(&mut tx, user_id, &free_points).await?;
            let plan = rules::plan_spend(&stat, current, balance, amount)?;

            store_stat_value(&mut tx, user_id, &stat, plan.new_value).await?;
            store_stat_value(&mut tx, user_id, &free_points, plan.balance_after).await?;
            tx.commit().await.map_err(db_error)?;

            Ok(StatSpend {
                stat_name: stat.name,
                previous_value: current,
                new_value: plan.new_value,
                consumed: plan.consumed,
                free_points_left: plan.balance_after,
            })
        })
        .await
    }

    async fn stat_types(&self) -> Result<Vec<StatType>, DomainError> {
        self.within("stat_types", async {
            let rows: Vec<StatTypeRow> = sqlx::query_as(
                "SELECT id, name, min_value, max_value, default_value FROM stat_types ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
            Ok(rows.into_iter().map(StatType::from).collect())
        })
        .await
    }
}
