//! Integration tests for `PgProgressionRepository`.

use duelbot_core::error::DomainError;
use duelbot_progression::domain::model::Verdict;
use duelbot_progression::domain::rules::{FREE_POINTS, TOTAL_FREE_POINTS};
use duelbot_progression::repository::ProgressionRepository;
use duelbot_store::PgProgressionRepository;
use sqlx::PgPool;

async fn force_stat(pool: &PgPool, username: &str, stat_name: &str, value: i32) {
    sqlx::query(
        "UPDATE user_stats SET value = $3
         WHERE user_id = (SELECT id FROM users WHERE username = $1)
           AND stat_type_id = (SELECT id FROM stat_types WHERE name = $2)",
    )
    .bind(username)
    .bind(stat_name)
    .bind(value)
    .execute(pool)
    .await
    .unwrap();
}

async fn stat_value(repo: &PgProgressionRepository, username: &str, stat_name: &str) -> i32 {
    repo.get_or_create_stats(username)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.name == stat_name)
        .map(|s| s.value)
        .unwrap()
}

// --- ensure_user ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_ensure_user_is_idempotent(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);

    let first = repo.ensure_user("alice").await.unwrap();
    let second = repo.ensure_user("alice").await.unwrap();

    assert_eq!(first, second);
    let user = repo.get_user("alice").await.unwrap().unwrap();
    assert_eq!(user.id, first);
}

// --- stat catalog ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_stat_types_returns_seeded_catalog_in_order(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);

    let names: Vec<String> = repo
        .stat_types()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();

    assert_eq!(
        names,
        vec![
            "strength",
            "agility",
            "intelligence",
            "luck",
            FREE_POINTS,
            TOTAL_FREE_POINTS
        ]
    );
}

// --- get_or_create_stats ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_or_create_stats_is_idempotent(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool.clone());

    let first = repo.get_or_create_stats("newcomer").await.unwrap();
    let second = repo.get_or_create_stats("newcomer").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 6);
    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_stats us JOIN users u ON u.id = us.user_id WHERE u.username = $1",
    )
    .bind("newcomer")
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(rows, 6);
}

// --- record_duel_result ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_tenth_win_awards_one_free_point(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);

    for round in 1..=10 {
        let settlement = repo
            .record_duel_result("alice", "bob", Verdict::InitiatorWins)
            .await
            .unwrap();
        assert_eq!(settlement.initiator.free_point_awarded, round == 10);
    }

    assert_eq!(stat_value(&repo, "alice", FREE_POINTS).await, 1);
    assert_eq!(stat_value(&repo, "alice", TOTAL_FREE_POINTS).await, 1);
    let bob = repo.get_user_results("bob").await.unwrap().unwrap();
    assert_eq!((bob.wins, bob.draws, bob.loses), (0, 0, 10));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_draw_counts_for_both_sides(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);

    let settlement = repo
        .record_duel_result("alice", "bob", Verdict::Draw)
        .await
        .unwrap();

    assert_eq!(settlement.initiator.draws, 1);
    assert_eq!(settlement.challenger.draws, 1);
    assert!(!settlement.initiator.free_point_awarded);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_self_duel_is_rejected_without_writes(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);

    let err = repo
        .record_duel_result("alice", "alice", Verdict::Draw)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
    assert!(repo.get_user("alice").await.unwrap().is_none());
}

// --- spend_free_points ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_spend_with_insufficient_balance_changes_nothing(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool.clone());
    repo.get_or_create_stats("alice").await.unwrap();
    force_stat(&pool, "alice", FREE_POINTS, 3).await;

    let err = repo
        .spend_free_points("alice", "strength", 5)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::InsufficientFreePoints {
            balance: 3,
            requested: 5
        }
    ));
    assert_eq!(stat_value(&repo, "alice", "strength").await, 1);
    assert_eq!(stat_value(&repo, "alice", FREE_POINTS).await, 3);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_spend_near_max_debits_only_what_fits(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool.clone());
    repo.get_or_create_stats("alice").await.unwrap();
    force_stat(&pool, "alice", FREE_POINTS, 10).await;
    force_stat(&pool, "alice", "strength", 99).await;

    let spend = repo.spend_free_points("alice", "strength", 10).await.unwrap();

    assert_eq!(spend.previous_value, 99);
    assert_eq!(spend.new_value, 100);
    assert_eq!(spend.consumed, 1);
    assert_eq!(spend.free_points_left, 9);
    assert_eq!(stat_value(&repo, "alice", FREE_POINTS).await, 9);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_spend_reports_unknown_stat_and_unknown_user(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);
    repo.ensure_user("alice").await.unwrap();

    let unknown_stat = repo.spend_free_points("alice", "charisma", 1).await.unwrap_err();
    let unknown_user = repo.spend_free_points("ghost", "luck", 1).await.unwrap_err();

    assert!(matches!(unknown_stat, DomainError::UnknownStat(name) if name == "charisma"));
    assert!(matches!(unknown_user, DomainError::UserNotFound(name) if name == "ghost"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_spend_seeds_missing_rows_for_existing_user(pool: PgPool) {
    let repo = PgProgressionRepository::new(pool);
    repo.ensure_user("alice").await.unwrap();

    // No stat rows yet: the balance defaults to zero.
    let err = repo.spend_free_points("alice", "luck", 1).await.unwrap_err();

    assert!(matches!(
        err,
        DomainError::InsufficientFreePoints { balance: 0, .. }
    ));
}
