//! Channel texts for the duel protocol.

use std::time::Duration;

/// Posted when a user opens a challenge.
#[must_use]
pub fn challenge_issued(username: &str, window: Duration) -> String {
    format!(
        "@{username} has issued a duel challenge! Type !duel in the next {} seconds to accept!",
        window.as_secs()
    )
}

/// Posted when the initiator repeats their own challenge.
#[must_use]
pub fn already_challenged(username: &str) -> String {
    format!("{username}, you've already challenged someone, wait for a response.")
}

/// Posted when a challenge is requested during the cooldown.
#[must_use]
pub fn cooldown_active(username: &str, remaining: Duration) -> String {
    format!(
        "@{username}, duels are on cooldown. Please wait {} before challenging again.",
        format_remaining(remaining)
    )
}

/// Posted when a challenge runs out with nobody accepting.
#[must_use]
pub fn challenge_expired(initiator: &str) -> String {
    format!("@{initiator}'s duel challenge has expired with no takers.")
}

/// Posted when the cooldown timer clears.
pub const COOLDOWN_ENDED: &str =
    "🔄The duel cooldown has ended! You can now challenge others again with !duel";

/// Posted when a request arrives while an accepted duel is being recorded.
#[must_use]
pub fn duel_in_progress(username: &str) -> String {
    format!("@{username}, a duel is being settled right now. Try again in a moment.")
}

/// Renders a duration rounded to whole seconds as `4m50s`, `12s` or `1h0m0s`.
#[must_use]
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_millis() >= 500 {
        secs += 1;
    }
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
