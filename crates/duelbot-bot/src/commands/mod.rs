//! Chat commands, registered in the order they are matched.

pub mod duel;
pub mod help;
pub mod hello;
pub mod role;
pub mod stats;
pub mod stream;
pub mod up;
pub mod who;

use crate::router::CommandRouter;

/// The bot's command table.
#[must_use]
pub fn default_router() -> CommandRouter {
    CommandRouter::new()
        .register("!help", "Displays a list of available commands.", help::Help)
        .register("!hello", "Displays a random greeting to user.", hello::Hello)
        .register("!title", "Displays the current stream title.", stream::Title)
        .register("!game", "Shows what game is currently being played.", stream::Game)
        .register("!who", "Shows participating streamers.", who::Who)
        .register("!role", "Shows your roles on this channel.", role::Role)
        .register("!stats", "Shows your stats and duel record.", stats::Stats)
        .register("!duel", "Challenges chat to a duel, or accepts an open challenge.", duel::Duel)
        .register(
            "!up",
            "Spends free points on a stat: !up <stat> <amount>.",
            up::Up,
        )
}
