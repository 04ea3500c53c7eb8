//! Outcome resolution: two rolls decide the verdict, the verdict picks the
//! flavor text.

use duelbot_core::error::DomainError;
use duelbot_core::rng::DeterministicRng;
use duelbot_progression::domain::model::Verdict;

use super::templates::DuelTemplates;

/// Rolls are uniform in `[0, ROLL_CEILING)`.
pub const ROLL_CEILING: u32 = 100;

/// Rolls this close (or closer) are a draw.
pub const DRAW_MARGIN: u32 = 5;

/// The two rolls behind a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rolls {
    /// The initiator's roll.
    pub initiator: u32,
    /// The challenger's roll.
    pub challenger: u32,
}

impl Rolls {
    /// Draws two independent rolls.
    pub fn roll(rng: &mut dyn DeterministicRng) -> Self {
        Self {
            initiator: rng.next_u32_range(0, ROLL_CEILING - 1),
            challenger: rng.next_u32_range(0, ROLL_CEILING - 1),
        }
    }

    /// Close rolls draw; otherwise the higher roll wins.
    #[must_use]
    pub fn verdict(self) -> Verdict {
        if self.initiator.abs_diff(self.challenger) <= DRAW_MARGIN {
            Verdict::Draw
        } else if self.initiator > self.challenger {
            Verdict::InitiatorWins
        } else {
            Verdict::ChallengerWins
        }
    }
}

/// A decided duel, ready to announce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuelOutcome {
    /// Who won.
    pub verdict: Verdict,
    /// The rolls that decided it.
    pub rolls: Rolls,
    /// First message: the announce text.
    pub announce: String,
    /// Second message: the duel text.
    pub narration: String,
}

/// Rolls a duel between `initiator` and `challenger` and renders its text.
///
/// # Errors
///
/// Returns `DomainError::Configuration` if the template bucket the verdict
/// needs is empty, or the RNG picks an index outside it.
pub fn resolve(
    templates: &DuelTemplates,
    initiator: &str,
    challenger: &str,
    rng: &mut dyn DeterministicRng,
) -> Result<DuelOutcome, DomainError> {
    let rolls = Rolls::roll(rng);
    let verdict = rolls.verdict();
    let draw = verdict == Verdict::Draw;

    let bucket = templates.bucket(draw);
    let template = rng
        .pick_index(bucket.len())
        .and_then(|index| bucket.get(index))
        .ok_or_else(|| {
            DomainError::Configuration(format!(
                "no {} duel template to pick ({} configured)",
                if draw { "draw" } else { "win" },
                bucket.len()
            ))
        })?;

    let winner = match verdict {
        Verdict::InitiatorWins => Some(initiator),
        Verdict::ChallengerWins => Some(challenger),
        Verdict::Draw => None,
    };

    Ok(DuelOutcome {
        verdict,
        rolls,
        announce: template.announce_for(initiator, challenger),
        narration: template.narration_for(winner),
    })
}
