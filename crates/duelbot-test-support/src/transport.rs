//! Test transports — recording and failing chat/relay doubles.

use std::sync::Mutex;

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use duelbot_core::transport::{ChatTransport, RelayNotifier};

/// A chat transport that records every `(channel, text)` it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all sent messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Returns only the texts of all sent messages.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, channel: &str, text: &str) -> Result<(), DomainError> {
        self.sent
            .lock()
            .unwrap()
            .push((channel.to_owned(), text.to_owned()));
        Ok(())
    }
}

/// A chat transport whose every send fails.
#[derive(Debug)]
pub struct FailingTransport;

#[async_trait]
impl ChatTransport for FailingTransport {
    async fn send(&self, _channel: &str, _text: &str) -> Result<(), DomainError> {
        Err(DomainError::Transport("connection reset".into()))
    }
}

/// A relay that records every operator notice.
#[derive(Debug, Default)]
pub struct RecordingRelay {
    notices: Mutex<Vec<String>>,
}

impl RecordingRelay {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all relayed notices.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayNotifier for RecordingRelay {
    async fn send_message(&self, text: &str) -> Result<(), DomainError> {
        self.notices.lock().unwrap().push(text.to_owned());
        Ok(())
    }
}
