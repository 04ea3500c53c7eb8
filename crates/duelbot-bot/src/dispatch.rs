//! Single dispatch point: routes inbound chat lines, runs handlers one at a
//! time, and posts their replies.

use std::sync::Arc;

use duelbot_core::error::DomainError;
use duelbot_core::transport::{ChatMessage, ChatTransport, RelayNotifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::router::{CommandRouter, Invocation};
use crate::state::BotState;

/// Inbound messages that may wait for the dispatcher.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// An inbound chat line tagged for tracing.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// Correlation id carried through logs.
    pub correlation_id: Uuid,
    /// The chat line.
    pub message: ChatMessage,
}

/// Sending half of the dispatcher queue.
#[derive(Debug, Clone)]
pub struct Inbox {
    sender: mpsc::Sender<Envelope>,
}

impl Inbox {
    /// Queues `message` for dispatch and returns its correlation id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Transport` if the dispatcher has stopped.
    pub async fn submit(&self, message: ChatMessage) -> Result<Uuid, DomainError> {
        let correlation_id = Uuid::new_v4();
        self.sender
            .send(Envelope {
                correlation_id,
                message,
            })
            .await
            .map_err(|_| DomainError::Transport("dispatcher is not running".to_owned()))?;
        Ok(correlation_id)
    }
}

/// Renders a failed command as the line the user sees.
#[must_use]
pub fn user_reply(username: &str, error: &DomainError) -> String {
    match error {
        DomainError::Validation(reason) => format!("@{username}, {reason}"),
        DomainError::UserNotFound(_) => {
            format!("@{username}, I don't know you yet. Type !stats to get started.")
        }
        DomainError::UnknownStat(name) => format!("@{username}, there is no stat called {name}."),
        DomainError::InsufficientFreePoints { balance, requested } => format!(
            "@{username}, you only have {balance} free points but asked to spend {requested}."
        ),
        DomainError::Configuration(_) | DomainError::Persistence(_) | DomainError::Transport(_) => {
            format!("Sorry @{username}, something went wrong. Please try again later.")
        }
    }
}

/// The bot: router, handler state and outbound ports.
pub struct Bot {
    state: BotState,
    router: CommandRouter,
    transport: Arc<dyn ChatTransport>,
    relay: Arc<dyn RelayNotifier>,
    bot_username: String,
}

impl Bot {
    /// Assembles a bot.
    #[must_use]
    pub fn new(
        state: BotState,
        router: CommandRouter,
        transport: Arc<dyn ChatTransport>,
        relay: Arc<dyn RelayNotifier>,
        bot_username: impl Into<String>,
    ) -> Self {
        Self {
            state,
            router,
            transport,
            relay,
            bot_username: bot_username.into().to_lowercase(),
        }
    }

    /// Handles one chat line and returns the replies it posted.
    ///
    /// Unmatched lines and the bot's own lines produce nothing. Failures
    /// become a reply to the user; infrastructure failures are also relayed
    /// to the operator.
    #[instrument(skip_all, fields(correlation_id = %correlation_id, username = %message.username))]
    pub async fn handle_message(&self, correlation_id: Uuid, message: &ChatMessage) -> Vec<String> {
        if message.username.eq_ignore_ascii_case(&self.bot_username) {
            return Vec::new();
        }
        let Some(routed) = self.router.route(&message.text) else {
            debug!("no command matched");
            return Vec::new();
        };

        let invocation = Invocation {
            message,
            args: routed.args,
            commands: self.router.summaries(),
        };
        let replies = match routed.handler.handle(&self.state, &invocation).await {
            Ok(replies) => {
                info!(command = routed.name, "command processed");
                replies
            }
            Err(e) => {
                if e.is_operational() {
                    error!(command = routed.name, error = %e, "command failed");
                    self.notify_operator(&format!(
                        "❌ {} failed for {}: {e}",
                        routed.name, message.username
                    ))
                    .await;
                } else {
                    info!(command = routed.name, error = %e, "command rejected");
                }
                vec![user_reply(&message.username, &e)]
            }
        };

        for reply in &replies {
            match self.transport.send(&message.channel, reply).await {
                Ok(()) => info!(channel = %message.channel, text = %reply, "reply sent"),
                Err(e) => error!(channel = %message.channel, error = %e, "failed to send reply"),
            }
        }
        replies
    }

    /// Sends `text` to the operator relay, logging a failure.
    pub async fn notify_operator(&self, text: &str) {
        if let Err(e) = self.relay.send_message(text).await {
            error!(error = %e, "relay notice failed");
        }
    }
}

/// Starts the dispatch task. Messages are handled strictly one at a time;
/// the task ends when every [`Inbox`] is dropped.
#[must_use]
pub fn spawn_dispatcher(bot: Bot, capacity: usize) -> (Inbox, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<Envelope>(capacity.max(1));
    let handle = tokio::spawn(async move {
        info!("dispatcher started");
        while let Some(envelope) = receiver.recv().await {
            bot.handle_message(envelope.correlation_id, &envelope.message)
                .await;
        }
        bot.notify_operator("duelbot dispatcher stopped").await;
        info!("dispatcher stopped");
    });
    (Inbox { sender }, handle)
}
