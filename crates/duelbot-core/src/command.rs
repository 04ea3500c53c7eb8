//! Command abstractions.

use uuid::Uuid;

/// Trait that all bookkeeping commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command from the chat line that caused it.
    fn correlation_id(&self) -> Uuid;

    /// The chat user on whose behalf the command runs.
    fn username(&self) -> &str;
}
