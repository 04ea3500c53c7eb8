//! Shared state: what command handlers see, and what HTTP routes see.

use std::sync::{Arc, Mutex};

use duelbot_core::rng::DeterministicRng;
use duelbot_duel::application::coordinator::DuelCoordinator;
use duelbot_progression::domain::labels::StatLabels;
use duelbot_progression::repository::ProgressionRepository;

use crate::config::Greeting;
use crate::dispatch::Inbox;
use crate::metadata::StreamMetadata;
use crate::outbox::Outbox;

/// Context handed to every chat command. Built once at startup.
pub struct BotState {
    /// Channel the bot serves.
    pub channel: String,
    /// Progression store.
    pub progression: Arc<dyn ProgressionRepository>,
    /// The duel arena.
    pub duels: DuelCoordinator,
    /// Validated stat display labels.
    pub labels: StatLabels,
    /// Greeting catalog for `!hello`.
    pub greetings: Vec<Greeting>,
    /// Participating streamers for `!who`.
    pub friends: Vec<String>,
    /// Stream title and game.
    pub metadata: Arc<dyn StreamMetadata>,
    /// Randomness for non-duel picks.
    pub rng: Arc<Mutex<dyn DeterministicRng>>,
}

/// Application state shared across all HTTP request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Queue into the dispatcher.
    pub inbox: Inbox,
    /// Buffered replies.
    pub outbox: Arc<Outbox>,
    /// The duel arena, for health reporting.
    pub duels: DuelCoordinator,
    /// Channel the bot serves.
    pub channel: String,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        inbox: Inbox,
        outbox: Arc<Outbox>,
        duels: DuelCoordinator,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            inbox,
            outbox,
            duels,
            channel: channel.into(),
        }
    }
}
