//! Streaming-platform metadata port.

use async_trait::async_trait;
use duelbot_core::error::DomainError;

/// Read-only view of the live stream, consumed by `!title` and `!game`.
#[async_trait]
pub trait StreamMetadata: Send + Sync {
    /// Current stream title.
    async fn title(&self, channel: &str) -> Result<String, DomainError>;

    /// Game currently being played.
    async fn current_game(&self, channel: &str) -> Result<String, DomainError>;
}

/// Metadata fixed at startup from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticStreamMetadata {
    title: Option<String>,
    game: Option<String>,
}

impl StaticStreamMetadata {
    /// Creates an adapter reporting `title` and `game`; `None` reads as
    /// unavailable.
    #[must_use]
    pub fn new(title: Option<String>, game: Option<String>) -> Self {
        Self { title, game }
    }
}

fn unavailable(what: &str, channel: &str) -> DomainError {
    DomainError::Transport(format!("{what} for {channel} is unavailable"))
}

#[async_trait]
impl StreamMetadata for StaticStreamMetadata {
    async fn title(&self, channel: &str) -> Result<String, DomainError> {
        self.title.clone().ok_or_else(|| unavailable("stream title", channel))
    }

    async fn current_game(&self, channel: &str) -> Result<String, DomainError> {
        self.game.clone().ok_or_else(|| unavailable("current game", channel))
    }
}
