//! Tests for the Progression command handlers over the in-memory repository.

use duelbot_core::error::DomainError;
use duelbot_progression::application::command_handlers::{
    handle_record_duel_result, handle_show_stats, handle_spend_free_points,
};
use duelbot_progression::domain::commands::{RecordDuelResult, ShowStats, SpendFreePoints};
use duelbot_progression::domain::model::{SideOutcome, Verdict};
use duelbot_progression::domain::rules::{FREE_POINTS, TOTAL_FREE_POINTS};
use duelbot_progression::repository::ProgressionRepository;
use duelbot_test_support::{FailingProgressionRepository, InMemoryProgressionRepository};
use uuid::Uuid;

fn duel(initiator: &str, challenger: &str, verdict: Verdict) -> RecordDuelResult {
    RecordDuelResult {
        correlation_id: Uuid::new_v4(),
        initiator: initiator.to_owned(),
        challenger: challenger.to_owned(),
        verdict,
    }
}

fn spend(username: &str, stat_name: &str, amount: i32) -> SpendFreePoints {
    SpendFreePoints {
        correlation_id: Uuid::new_v4(),
        username: username.to_owned(),
        stat_name: stat_name.to_owned(),
        amount,
    }
}

// --- record_duel_result ---

#[tokio::test]
async fn test_tenth_win_awards_exactly_one_free_point() {
    let repo = InMemoryProgressionRepository::new();

    for round in 1..=10 {
        let settlement = handle_record_duel_result(&duel("alice", "bob", Verdict::InitiatorWins), &repo)
            .await
            .unwrap();
        assert_eq!(settlement.initiator.wins, round);
        assert_eq!(settlement.initiator.free_point_awarded, round == 10, "round {round}");
        assert!(!settlement.challenger.free_point_awarded);
        if round == 5 {
            assert_eq!(repo.stat_value("alice", FREE_POINTS), Some(0));
        }
    }

    assert_eq!(repo.stat_value("alice", FREE_POINTS), Some(1));
    assert_eq!(repo.stat_value("alice", TOTAL_FREE_POINTS), Some(1));
    assert_eq!(repo.stat_value("bob", FREE_POINTS), Some(0));
}

#[tokio::test]
async fn test_threshold_grows_after_five_lifetime_points() {
    let repo = InMemoryProgressionRepository::new();
    repo.seed_stat("alice", TOTAL_FREE_POINTS, 5);

    // At total 5 the win threshold is 20: the 10th win no longer earns.
    let mut awarded_at = Vec::new();
    for round in 1..=20 {
        let settlement = handle_record_duel_result(&duel("alice", "bob", Verdict::InitiatorWins), &repo)
            .await
            .unwrap();
        if settlement.initiator.free_point_awarded {
            awarded_at.push(round);
        }
    }

    assert_eq!(awarded_at, vec![20]);
    assert_eq!(repo.stat_value("alice", TOTAL_FREE_POINTS), Some(6));
}

#[tokio::test]
async fn test_draws_count_for_both_sides_and_earn_at_twenty() {
    let repo = InMemoryProgressionRepository::new();

    let mut last = None;
    for _ in 0..20 {
        last = Some(
            handle_record_duel_result(&duel("alice", "bob", Verdict::Draw), &repo)
                .await
                .unwrap(),
        );
    }
    let settlement = last.unwrap();

    assert_eq!(settlement.initiator.outcome, SideOutcome::Draw);
    assert_eq!(settlement.challenger.draws, 20);
    assert!(settlement.initiator.free_point_awarded);
    assert!(settlement.challenger.free_point_awarded);
}

#[tokio::test]
async fn test_loser_counter_increments_without_award() {
    let repo = InMemoryProgressionRepository::new();

    let settlement = handle_record_duel_result(&duel("alice", "bob", Verdict::ChallengerWins), &repo)
        .await
        .unwrap();

    assert_eq!(settlement.initiator.loses, 1);
    assert_eq!(settlement.initiator.wins, 0);
    assert_eq!(settlement.challenger.wins, 1);
    let results = repo.get_user_results("alice").await.unwrap().unwrap();
    assert_eq!((results.wins, results.draws, results.loses), (0, 0, 1));
}

#[tokio::test]
async fn test_self_duel_is_rejected() {
    let repo = InMemoryProgressionRepository::new();

    let err = handle_record_duel_result(&duel("alice", "alice", Verdict::Draw), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
    assert!(repo.get_user("alice").await.unwrap().is_none());
}

// --- spend_free_points ---

#[tokio::test]
async fn test_spend_with_insufficient_balance_leaves_stat_unchanged() {
    let repo = InMemoryProgressionRepository::new();
    repo.seed_stat("alice", FREE_POINTS, 3);
    repo.seed_stat("alice", "strength", 10);

    let err = handle_spend_free_points(&spend("alice", "strength", 5), &repo)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::InsufficientFreePoints {
            balance: 3,
            requested: 5
        }
    ));
    assert_eq!(repo.stat_value("alice", "strength"), Some(10));
    assert_eq!(repo.stat_value("alice", FREE_POINTS), Some(3));
}

#[tokio::test]
async fn test_spend_clamped_at_max_debits_only_one_point() {
    let repo = InMemoryProgressionRepository::new();
    repo.seed_stat("alice", FREE_POINTS, 10);
    repo.seed_stat("alice", "strength", 99);

    let result = handle_spend_free_points(&spend("alice", "strength", 10), &repo)
        .await
        .unwrap();

    assert_eq!(result.new_value, 100);
    assert_eq!(result.consumed, 1);
    assert_eq!(result.free_points_left, 9);
    assert_eq!(repo.stat_value("alice", FREE_POINTS), Some(9));
}

#[tokio::test]
async fn test_spend_on_currency_stat_is_validation_error() {
    let repo = InMemoryProgressionRepository::new();
    repo.seed_stat("alice", FREE_POINTS, 10);

    let err = handle_spend_free_points(&spend("alice", FREE_POINTS, 1), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(repo.stat_value("alice", FREE_POINTS), Some(10));
}

#[tokio::test]
async fn test_spend_on_unknown_stat_is_unknown_stat() {
    let repo = InMemoryProgressionRepository::new();
    repo.seed_stat("alice", FREE_POINTS, 10);

    let err = handle_spend_free_points(&spend("alice", "charisma", 1), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::UnknownStat(name) if name == "charisma"));
}

#[tokio::test]
async fn test_spend_for_unknown_user_is_user_not_found() {
    let repo = InMemoryProgressionRepository::new();

    let err = handle_spend_free_points(&spend("ghost", "luck", 1), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::UserNotFound(_)));
}

// --- show_stats ---

#[tokio::test]
async fn test_show_stats_seeds_defaults_once() {
    let repo = InMemoryProgressionRepository::new();
    let command = ShowStats {
        correlation_id: Uuid::new_v4(),
        username: "newcomer".to_owned(),
    };

    let first = handle_show_stats(&command, &repo).await.unwrap();
    let second = handle_show_stats(&command, &repo).await.unwrap();

    assert_eq!(first, second);
    assert!(first.results.is_none());
    assert_eq!(first.stats.len(), repo.stat_types().await.unwrap().len());
    let strength = first.stats.iter().find(|s| s.name == "strength").unwrap();
    assert_eq!(strength.value, 1);
}

#[tokio::test]
async fn test_show_stats_propagates_persistence_failure() {
    let command = ShowStats {
        correlation_id: Uuid::new_v4(),
        username: "alice".to_owned(),
    };

    let err = handle_show_stats(&command, &FailingProgressionRepository)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Persistence(_)));
}
