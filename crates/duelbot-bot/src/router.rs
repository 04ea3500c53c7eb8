//! Command router: ordered prefix matching of chat lines to handlers.
//!
//! Registration order matters. A line is lower-cased and trimmed, and the
//! first registered command whose name is a prefix of it wins; the rest of
//! the line, split on whitespace, becomes the arguments.

use async_trait::async_trait;
use duelbot_core::error::DomainError;
use duelbot_core::transport::ChatMessage;

use crate::state::BotState;

/// Name and description of a registered command, as `!help` lists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSummary {
    /// Trigger, e.g. `!duel`.
    pub name: String,
    /// One-line description.
    pub description: String,
}

/// Everything a handler gets besides the shared state.
#[derive(Debug)]
pub struct Invocation<'a> {
    /// The chat line that triggered the command.
    pub message: &'a ChatMessage,
    /// Whitespace-split remainder after the command name.
    pub args: Vec<String>,
    /// Every registered command, in registration order.
    pub commands: &'a [CommandSummary],
}

impl Invocation<'_> {
    /// The invoking user.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.message.username
    }
}

/// A chat command. Returns the reply lines to post, in order.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Runs the command.
    async fn handle(
        &self,
        state: &BotState,
        invocation: &Invocation<'_>,
    ) -> Result<Vec<String>, DomainError>;
}

/// A matched command, ready to run.
pub struct Routed<'r> {
    /// The matched command's name.
    pub name: &'r str,
    /// Its handler.
    pub handler: &'r dyn CommandHandler,
    /// Whitespace-split remainder of the line.
    pub args: Vec<String>,
}

/// Ordered command table.
#[derive(Default)]
pub struct CommandRouter {
    summaries: Vec<CommandSummary>,
    handlers: Vec<Box<dyn CommandHandler>>,
}

impl CommandRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a command. Earlier registrations win prefix collisions.
    #[must_use]
    pub fn register(
        mut self,
        name: &str,
        description: &str,
        handler: impl CommandHandler + 'static,
    ) -> Self {
        self.summaries.push(CommandSummary {
            name: name.to_lowercase(),
            description: description.to_owned(),
        });
        self.handlers.push(Box::new(handler));
        self
    }

    /// Registered commands in registration order.
    #[must_use]
    pub fn summaries(&self) -> &[CommandSummary] {
        &self.summaries
    }

    /// Finds the command for `text`, or `None` if nothing matches.
    #[must_use]
    pub fn route(&self, text: &str) -> Option<Routed<'_>> {
        let line = text.trim().to_lowercase();
        self.summaries
            .iter()
            .zip(&self.handlers)
            .find(|(summary, _)| line.starts_with(summary.name.as_str()))
            .map(|(summary, handler)| Routed {
                name: &summary.name,
                handler: handler.as_ref(),
                args: line[summary.name.len()..]
                    .split_whitespace()
                    .map(str::to_owned)
                    .collect(),
            })
    }
}
