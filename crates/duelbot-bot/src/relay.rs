//! Operator relay backed by the log.

use async_trait::async_trait;
use duelbot_core::clock::Clock;
use duelbot_core::error::DomainError;
use duelbot_core::transport::RelayNotifier;
use tracing::warn;

/// Writes operator notices to the `relay` log target.
pub struct LogRelay {
    clock: Box<dyn Clock>,
}

impl LogRelay {
    /// Creates a relay stamping notices with `clock`.
    #[must_use]
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }
}

#[async_trait]
impl RelayNotifier for LogRelay {
    async fn send_message(&self, text: &str) -> Result<(), DomainError> {
        warn!(target: "relay", at = %self.clock.stamp(), notice = %text, "operator notice");
        Ok(())
    }
}
