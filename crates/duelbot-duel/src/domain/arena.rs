//! The duel arena: challenge and cooldown state machine.
//!
//! `Idle → Pending → {Settling → Idle + Cooldown, Idle (expired)}`. The
//! cooldown is an independent overlay that blocks new challenges.
//!
//! The arena is plain data with synchronous transitions taking `now`
//! explicitly. The coordinator owns it behind a mutex and calls these
//! transitions for direct requests and timer fires alike; timers carry the
//! id of the challenge or cooldown they were scheduled for, and a
//! transition whose id no longer matches does nothing.

use std::time::Duration;

use tokio::time::Instant;

/// Protocol timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelTimings {
    /// How long a challenge stays open.
    pub challenge_window: Duration,
    /// How long new challenges are blocked after a duel.
    pub cooldown: Duration,
}

impl Default for DuelTimings {
    fn default() -> Self {
        Self {
            challenge_window: Duration::from_secs(60),
            cooldown: Duration::from_secs(300),
        }
    }
}

/// Monotonic identifier of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChallengeId(u64);

/// Monotonic identifier of a cooldown period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CooldownId(u64);

/// Externally visible arena phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuelPhase {
    /// Nothing open, no cooldown.
    Idle,
    /// A challenge is open and waiting for a taker.
    Pending,
    /// A challenge was accepted and its result is being recorded.
    Settling,
    /// New challenges are blocked.
    Cooldown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChallengeStatus {
    Open,
    Settling,
}

#[derive(Debug, Clone)]
struct Challenge {
    id: ChallengeId,
    initiator: String,
    challenger: Option<String>,
    issued_at: Instant,
    status: ChallengeStatus,
}

#[derive(Debug, Clone, Copy)]
struct Cooldown {
    id: CooldownId,
    until: Instant,
}

/// What a duel request turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Cooldown is active; nothing changed.
    CoolingDown {
        /// Time left until challenges open again.
        remaining: Duration,
    },
    /// A new challenge was opened.
    Issued {
        /// The new challenge.
        id: ChallengeId,
    },
    /// The requester already has the open challenge; nothing changed.
    AlreadyChallenged,
    /// An accepted duel is being recorded; nothing changed.
    InProgress,
    /// The requester took the open challenge, which is now settling.
    Accepted {
        /// The accepted challenge.
        id: ChallengeId,
        /// Who issued it.
        initiator: String,
    },
}

/// What became of a settlement that could not be recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Abandonment {
    /// The challenge is open again and its expiry timer still stands.
    Reopened,
    /// The window ran out while settling; the challenge is closed and its
    /// expiry must be announced now.
    Expired {
        /// Who issued it.
        initiator: String,
    },
    /// `id` is not the settling challenge.
    Stale,
}

/// The single system-wide duel arena.
#[derive(Debug)]
pub struct DuelArena {
    timings: DuelTimings,
    challenge: Option<Challenge>,
    cooldown: Option<Cooldown>,
    next_challenge: u64,
    next_cooldown: u64,
}

impl DuelArena {
    /// Creates an idle arena.
    #[must_use]
    pub fn new(timings: DuelTimings) -> Self {
        Self {
            timings,
            challenge: None,
            cooldown: None,
            next_challenge: 0,
            next_cooldown: 0,
        }
    }

    /// The arena's timings.
    #[must_use]
    pub fn timings(&self) -> DuelTimings {
        self.timings
    }

    /// Handles a duel request from `username`.
    pub fn request(&mut self, username: &str, now: Instant) -> Admission {
        if let Some(cooldown) = self.cooldown {
            if now < cooldown.until {
                return Admission::CoolingDown {
                    remaining: cooldown.until - now,
                };
            }
            // Lapsed before its timer ran; the late timer will find nothing to clear.
            self.cooldown = None;
        }

        if let Some(challenge) = self.challenge.as_mut() {
            match challenge.status {
                ChallengeStatus::Settling => return Admission::InProgress,
                ChallengeStatus::Open
                    if now.duration_since(challenge.issued_at) >= self.timings.challenge_window =>
                {
                    self.challenge = None;
                }
                ChallengeStatus::Open if challenge.initiator == username => {
                    return Admission::AlreadyChallenged;
                }
                ChallengeStatus::Open => {
                    challenge.status = ChallengeStatus::Settling;
                    challenge.challenger = Some(username.to_owned());
                    return Admission::Accepted {
                        id: challenge.id,
                        initiator: challenge.initiator.clone(),
                    };
                }
            }
        }

        self.next_challenge += 1;
        let id = ChallengeId(self.next_challenge);
        self.challenge = Some(Challenge {
            id,
            initiator: username.to_owned(),
            challenger: None,
            issued_at: now,
            status: ChallengeStatus::Open,
        });
        Admission::Issued { id }
    }

    /// Returns a settling challenge to open, as if it had never been
    /// accepted. A challenge whose window ran out meanwhile missed its
    /// expiry timer, so it is closed here instead.
    pub fn abandon(&mut self, id: ChallengeId, now: Instant) -> Abandonment {
        let window = self.timings.challenge_window;
        match self.challenge.as_mut() {
            Some(challenge) if challenge.id == id && challenge.status == ChallengeStatus::Settling => {
                if now.duration_since(challenge.issued_at) >= window {
                    let initiator = std::mem::take(&mut challenge.initiator);
                    self.challenge = None;
                    return Abandonment::Expired { initiator };
                }
                challenge.status = ChallengeStatus::Open;
                challenge.challenger = None;
                Abandonment::Reopened
            }
            _ => Abandonment::Stale,
        }
    }

    /// Closes a settled challenge and starts the cooldown.
    pub fn complete(&mut self, id: ChallengeId, now: Instant) -> Option<CooldownId> {
        match &self.challenge {
            Some(challenge) if challenge.id == id && challenge.status == ChallengeStatus::Settling => {
                self.challenge = None;
                self.next_cooldown += 1;
                let cooldown = CooldownId(self.next_cooldown);
                self.cooldown = Some(Cooldown {
                    id: cooldown,
                    until: now + self.timings.cooldown,
                });
                Some(cooldown)
            }
            _ => None,
        }
    }

    /// Expiry timer fire: closes the challenge if it is still the open one.
    /// Returns the initiator to announce, or `None` for a stale fire.
    pub fn expire(&mut self, id: ChallengeId) -> Option<String> {
        match &self.challenge {
            Some(challenge) if challenge.id == id && challenge.status == ChallengeStatus::Open => {
                self.challenge.take().map(|challenge| challenge.initiator)
            }
            _ => None,
        }
    }

    /// Cooldown timer fire: clears the cooldown if it is still the current
    /// one. Returns `false` for a stale fire.
    pub fn end_cooldown(&mut self, id: CooldownId) -> bool {
        match self.cooldown {
            Some(cooldown) if cooldown.id == id => {
                self.cooldown = None;
                true
            }
            _ => false,
        }
    }

    /// Current phase as observed at `now`.
    #[must_use]
    pub fn phase(&self, now: Instant) -> DuelPhase {
        if self.cooldown.is_some_and(|cooldown| now < cooldown.until) {
            return DuelPhase::Cooldown;
        }
        match &self.challenge {
            Some(challenge) if challenge.status == ChallengeStatus::Settling => DuelPhase::Settling,
            Some(challenge)
                if now.duration_since(challenge.issued_at) < self.timings.challenge_window =>
            {
                DuelPhase::Pending
            }
            _ => DuelPhase::Idle,
        }
    }

    /// Initiator of the current challenge, open or settling.
    #[must_use]
    pub fn initiator(&self) -> Option<&str> {
        self.challenge.as_ref().map(|c| c.initiator.as_str())
    }

    /// Challenger of a settling challenge.
    #[must_use]
    pub fn challenger(&self) -> Option<&str> {
        self.challenge.as_ref().and_then(|c| c.challenger.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    fn arena() -> DuelArena {
        DuelArena::new(DuelTimings::default())
    }

    #[test]
    fn test_first_request_issues_a_challenge() {
        let mut arena = arena();
        let t0 = Instant::now();

        let admission = arena.request("alice", t0);

        assert!(matches!(admission, Admission::Issued { .. }));
        assert_eq!(arena.phase(t0), DuelPhase::Pending);
        assert_eq!(arena.initiator(), Some("alice"));
    }

    #[test]
    fn test_same_user_rechallenge_is_rejected_without_mutation() {
        let mut arena = arena();
        let t0 = Instant::now();
        arena.request("alice", t0);

        assert_eq!(arena.request("alice", t0 + secs(5)), Admission::AlreadyChallenged);
        assert_eq!(arena.request("alice", t0 + secs(10)), Admission::AlreadyChallenged);

        assert_eq!(arena.phase(t0 + secs(10)), DuelPhase::Pending);
        assert_eq!(arena.challenger(), None);
    }

    #[test]
    fn test_other_user_accepts_and_challenge_settles() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };

        let admission = arena.request("bob", t0 + secs(20));

        assert_eq!(
            admission,
            Admission::Accepted {
                id,
                initiator: "alice".to_owned()
            }
        );
        assert_eq!(arena.phase(t0 + secs(20)), DuelPhase::Settling);
        assert_eq!(arena.challenger(), Some("bob"));
    }

    #[test]
    fn test_request_while_settling_is_in_progress() {
        let mut arena = arena();
        let t0 = Instant::now();
        arena.request("alice", t0);
        arena.request("bob", t0 + secs(1));

        assert_eq!(arena.request("carol", t0 + secs(2)), Admission::InProgress);
        assert_eq!(arena.challenger(), Some("bob"));
    }

    #[test]
    fn test_complete_starts_cooldown_with_decreasing_remaining_time() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };
        arena.request("bob", t0 + secs(1));

        assert!(arena.complete(id, t0 + secs(1)).is_some());

        assert_eq!(arena.phase(t0 + secs(1)), DuelPhase::Cooldown);
        let Admission::CoolingDown { remaining: first } = arena.request("carol", t0 + secs(11)) else {
            panic!("expected cooldown");
        };
        let Admission::CoolingDown { remaining: second } = arena.request("carol", t0 + secs(61)) else {
            panic!("expected cooldown");
        };
        assert_eq!(first, secs(290));
        assert_eq!(second, secs(240));
        assert!(matches!(
            arena.request("carol", t0 + secs(301)),
            Admission::Issued { .. }
        ));
    }

    #[test]
    fn test_abandon_reopens_the_same_challenge() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };
        arena.request("bob", t0 + secs(1));

        assert_eq!(arena.abandon(id, t0 + secs(2)), Abandonment::Reopened);

        assert_eq!(arena.phase(t0 + secs(2)), DuelPhase::Pending);
        assert_eq!(arena.initiator(), Some("alice"));
        assert_eq!(arena.challenger(), None);
        assert!(arena.complete(id, t0 + secs(2)).is_none());
        assert_eq!(arena.abandon(id, t0 + secs(2)), Abandonment::Stale);
    }

    #[test]
    fn test_abandon_after_the_window_closes_the_challenge() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };
        arena.request("bob", t0 + secs(58));
        // The expiry timer fires mid-settlement and is ignored.
        assert_eq!(arena.expire(id), None);

        assert_eq!(
            arena.abandon(id, t0 + secs(63)),
            Abandonment::Expired {
                initiator: "alice".to_owned()
            }
        );
        assert_eq!(arena.phase(t0 + secs(63)), DuelPhase::Idle);
        assert_eq!(arena.initiator(), None);
        assert!(matches!(
            arena.request("carol", t0 + secs(64)),
            Admission::Issued { .. }
        ));
    }

    #[test]
    fn test_expire_closes_open_challenge_once() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };

        assert_eq!(arena.expire(id), Some("alice".to_owned()));
        assert_eq!(arena.expire(id), None);
        assert_eq!(arena.phase(t0 + secs(60)), DuelPhase::Idle);
    }

    #[test]
    fn test_stale_expiry_after_acceptance_is_ignored() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };
        arena.request("bob", t0 + secs(59));

        assert_eq!(arena.expire(id), None);
        assert_eq!(arena.phase(t0 + secs(60)), DuelPhase::Settling);
    }

    #[test]
    fn test_expiry_of_superseded_challenge_is_ignored() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id: old } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };
        // Stale after the window: the next request supersedes it.
        let Admission::Issued { id: new } = arena.request("bob", t0 + secs(61)) else {
            panic!("expected a fresh challenge");
        };

        assert_ne!(old, new);
        assert_eq!(arena.expire(old), None);
        assert_eq!(arena.initiator(), Some("bob"));
    }

    #[test]
    fn test_stale_cooldown_timer_does_not_clear_newer_cooldown() {
        let mut arena = arena();
        let t0 = Instant::now();
        let Admission::Issued { id } = arena.request("alice", t0) else {
            panic!("expected a new challenge");
        };
        arena.request("bob", t0);
        let first = arena.complete(id, t0).unwrap();

        // First cooldown lapses without its timer; a second duel starts another.
        let Admission::Issued { id } = arena.request("carol", t0 + secs(300)) else {
            panic!("expected a new challenge");
        };
        arena.request("dave", t0 + secs(301));
        let second = arena.complete(id, t0 + secs(301)).unwrap();

        assert!(!arena.end_cooldown(first));
        assert_eq!(arena.phase(t0 + secs(302)), DuelPhase::Cooldown);
        assert!(arena.end_cooldown(second));
        assert_eq!(arena.phase(t0 + secs(302)), DuelPhase::Idle);
    }
}
