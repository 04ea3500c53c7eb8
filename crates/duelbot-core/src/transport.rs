//! Ports for the chat transport and the operator relay.
//!
//! The core never manages connection lifecycle: it receives already-parsed
//! [`ChatMessage`]s and hands reply text to a [`ChatTransport`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// An inbound chat line as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Channel the line was posted in.
    pub channel: String,
    /// Login name of the author.
    pub username: String,
    /// Role badges attached to the author (badge name to badge version).
    #[serde(default)]
    pub badges: HashMap<String, u32>,
    /// Raw message text.
    pub text: String,
}

impl ChatMessage {
    /// Returns `true` if the author carries `badge` with a non-zero version.
    #[must_use]
    pub fn has_badge(&self, badge: &str) -> bool {
        self.badges.get(badge).is_some_and(|version| *version > 0)
    }
}

/// Outbound side of the chat transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Post `text` to `channel`.
    async fn send(&self, channel: &str, text: &str) -> Result<(), DomainError>;
}

/// Fire-and-forget operator channel for fatal errors and lifecycle notices.
#[async_trait]
pub trait RelayNotifier: Send + Sync {
    /// Deliver `text` to the operator. Callers log failures and move on.
    async fn send_message(&self, text: &str) -> Result<(), DomainError>;
}
