//! Outbound side of the HTTP chat bridge.
//!
//! Replies are buffered here until the bridge peer drains them. The buffer
//! is bounded; when it is full the oldest message is dropped.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use duelbot_core::transport::ChatTransport;
use serde::Serialize;
use tracing::{info, warn};

/// Messages kept when nobody drains the outbox.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 1024;

/// A message waiting to be posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundMessage {
    /// Target channel.
    pub channel: String,
    /// Text to post.
    pub text: String,
}

/// Bounded buffer implementing [`ChatTransport`].
#[derive(Debug)]
pub struct Outbox {
    capacity: usize,
    queue: Mutex<VecDeque<OutboundMessage>>,
}

impl Default for Outbox {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_OUTBOX_CAPACITY)
    }
}

impl Outbox {
    /// Creates an outbox holding at most `capacity` messages.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Takes every buffered message, oldest first.
    pub fn drain(&self) -> Vec<OutboundMessage> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.drain(..).collect()
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ChatTransport for Outbox {
    async fn send(&self, channel: &str, text: &str) -> Result<(), DomainError> {
        let mut queue = self
            .queue
            .lock()
            .map_err(|e| DomainError::Transport(format!("outbox lock poisoned: {e}")))?;
        if queue.len() >= self.capacity {
            if let Some(dropped) = queue.pop_front() {
                warn!(channel = %dropped.channel, text = %dropped.text, "outbox full, dropping oldest message");
            }
        }
        queue.push_back(OutboundMessage {
            channel: channel.to_owned(),
            text: text.to_owned(),
        });
        info!(%channel, %text, "reply queued");
        Ok(())
    }
}
