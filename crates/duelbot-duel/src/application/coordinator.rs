//! Duel coordinator: the arena behind one lock, plus its timers.
//!
//! The lock guards only in-memory decisions. Rolling, persisting and
//! posting all happen with the lock released, so acceptance is two-phase:
//! the arena marks the challenge settling, the result is recorded, and the
//! lock is taken again to complete or abandon it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use duelbot_core::error::DomainError;
use duelbot_core::rng::DeterministicRng;
use duelbot_core::transport::ChatTransport;
use duelbot_progression::application::command_handlers::handle_record_duel_result;
use duelbot_progression::domain::commands::RecordDuelResult;
use duelbot_progression::repository::ProgressionRepository;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::domain::arena::{
    Abandonment, Admission, ChallengeId, CooldownId, DuelArena, DuelPhase, DuelTimings,
};
use crate::domain::messages;
use crate::domain::outcome::resolve;
use crate::domain::templates::DuelTemplates;

struct ArenaSlot {
    arena: DuelArena,
    expiry_timer: Option<JoinHandle<()>>,
}

struct Shared {
    slot: Mutex<ArenaSlot>,
    templates: DuelTemplates,
    rng: Arc<Mutex<dyn DeterministicRng>>,
    progression: Arc<dyn ProgressionRepository>,
    transport: Arc<dyn ChatTransport>,
    channel: String,
}

impl Shared {
    // Every arena transition leaves the arena consistent, so a poisoned
    // lock still guards valid state.
    fn slot(&self) -> MutexGuard<'_, ArenaSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn post(&self, text: &str) {
        match self.transport.send(&self.channel, text).await {
            Ok(()) => info!(channel = %self.channel, %text, "duel notice posted"),
            Err(e) => error!(channel = %self.channel, error = %e, "failed to post duel notice"),
        }
    }

    async fn fire_expiry(&self, id: ChallengeId) {
        let expired = {
            let mut slot = self.slot();
            let initiator = slot.arena.expire(id);
            if initiator.is_some() {
                slot.expiry_timer = None;
            }
            initiator
        };
        match expired {
            Some(initiator) => {
                info!(?id, %initiator, "duel challenge expired");
                self.post(&messages::challenge_expired(&initiator)).await;
            }
            None => debug!(?id, "stale expiry timer ignored"),
        }
    }

    async fn fire_cooldown_end(&self, id: CooldownId) {
        let ended = self.slot().arena.end_cooldown(id);
        if ended {
            info!(?id, "duel cooldown ended");
            self.post(messages::COOLDOWN_ENDED).await;
        } else {
            debug!(?id, "stale cooldown timer ignored");
        }
    }
}

fn spawn_expiry(shared: &Arc<Shared>, id: ChallengeId, after: Duration) -> JoinHandle<()> {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        sleep(after).await;
        shared.fire_expiry(id).await;
    })
}

fn spawn_cooldown_end(shared: &Arc<Shared>, id: CooldownId, after: Duration) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        sleep(after).await;
        shared.fire_cooldown_end(id).await;
    });
}

/// Owns the single duel arena and runs its protocol.
///
/// Cheap to clone; clones share the same arena.
#[derive(Clone)]
pub struct DuelCoordinator {
    shared: Arc<Shared>,
}

impl DuelCoordinator {
    /// Creates a coordinator with an idle arena posting timer notices to
    /// `channel`.
    #[must_use]
    pub fn new(
        templates: DuelTemplates,
        rng: Arc<Mutex<dyn DeterministicRng>>,
        progression: Arc<dyn ProgressionRepository>,
        transport: Arc<dyn ChatTransport>,
        channel: impl Into<String>,
        timings: DuelTimings,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(ArenaSlot {
                    arena: DuelArena::new(timings),
                    expiry_timer: None,
                }),
                templates,
                rng,
                progression,
                transport,
                channel: channel.into(),
            }),
        }
    }

    /// Current arena phase.
    #[must_use]
    pub fn phase(&self) -> DuelPhase {
        self.shared.slot().arena.phase(Instant::now())
    }

    /// Initiator of the current challenge, if any.
    #[must_use]
    pub fn initiator(&self) -> Option<String> {
        self.shared.slot().arena.initiator().map(str::to_owned)
    }

    /// Handles a `!duel` from `username` and returns the reply lines.
    ///
    /// An acceptance replies with the announce text followed by the duel
    /// text, and only once the result is recorded.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Persistence` if the result could not be
    /// recorded and `DomainError::Configuration` if no template fits the
    /// verdict. Either way nothing is posted and the challenge is reopened,
    /// or announced as expired if its window ran out while settling.
    #[instrument(skip(self))]
    pub async fn request_duel(&self, username: &str) -> Result<Vec<String>, DomainError> {
        let (admission, window) = {
            let mut slot = self.shared.slot();
            let window = slot.arena.timings().challenge_window;
            let admission = slot.arena.request(username, Instant::now());
            if let Admission::Issued { id } = admission {
                // Any previous timer belongs to a superseded challenge.
                if let Some(previous) = slot.expiry_timer.take() {
                    previous.abort();
                }
                slot.expiry_timer = Some(spawn_expiry(&self.shared, id, window));
            }
            (admission, window)
        };

        match admission {
            Admission::CoolingDown { remaining } => {
                debug!(?remaining, "duel requested during cooldown");
                Ok(vec![messages::cooldown_active(username, remaining)])
            }
            Admission::Issued { id } => {
                info!(?id, "duel challenge issued");
                Ok(vec![messages::challenge_issued(username, window)])
            }
            Admission::AlreadyChallenged => Ok(vec![messages::already_challenged(username)]),
            Admission::InProgress => Ok(vec![messages::duel_in_progress(username)]),
            Admission::Accepted { id, initiator } => self.settle(id, &initiator, username).await,
        }
    }

    async fn settle(
        &self,
        id: ChallengeId,
        initiator: &str,
        challenger: &str,
    ) -> Result<Vec<String>, DomainError> {
        let resolved = {
            let mut rng = self.shared.rng.lock().unwrap_or_else(PoisonError::into_inner);
            resolve(&self.shared.templates, initiator, challenger, &mut *rng)
        };
        let outcome = match resolved {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(?id, error = %e, "duel could not be resolved");
                self.abandon(id).await;
                return Err(e);
            }
        };

        let command = RecordDuelResult {
            correlation_id: Uuid::new_v4(),
            initiator: initiator.to_owned(),
            challenger: challenger.to_owned(),
            verdict: outcome.verdict,
        };
        if let Err(e) = handle_record_duel_result(&command, self.shared.progression.as_ref()).await {
            error!(?id, error = %e, "duel result not recorded");
            self.abandon(id).await;
            return Err(e);
        }

        {
            let mut slot = self.shared.slot();
            let length = slot.arena.timings().cooldown;
            if let Some(cooldown) = slot.arena.complete(id, Instant::now()) {
                if let Some(timer) = slot.expiry_timer.take() {
                    timer.abort();
                }
                spawn_cooldown_end(&self.shared, cooldown, length);
            }
        }
        info!(
            ?id,
            verdict = ?outcome.verdict,
            initiator_roll = outcome.rolls.initiator,
            challenger_roll = outcome.rolls.challenger,
            "duel settled"
        );

        Ok(vec![outcome.announce, outcome.narration])
    }

    async fn abandon(&self, id: ChallengeId) {
        let abandonment = {
            let mut slot = self.shared.slot();
            let abandonment = slot.arena.abandon(id, Instant::now());
            if matches!(abandonment, Abandonment::Expired { .. }) {
                if let Some(timer) = slot.expiry_timer.take() {
                    timer.abort();
                }
            }
            abandonment
        };
        match abandonment {
            Abandonment::Reopened => info!(?id, "duel challenge reopened"),
            Abandonment::Expired { initiator } => {
                info!(?id, %initiator, "duel challenge expired while settling");
                self.shared.post(&messages::challenge_expired(&initiator)).await;
            }
            Abandonment::Stale => debug!(?id, "abandon of a closed challenge ignored"),
        }
    }
}
