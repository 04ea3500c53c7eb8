//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Bad command arguments (non-integer or non-positive amount, forbidden
    /// target, self-duel).
    #[error("validation error: {0}")]
    Validation(String),

    /// No user record exists for the given username.
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// The named stat is not in the stat catalog.
    #[error("unknown stat: {0}")]
    UnknownStat(String),

    /// The free-points balance does not cover the requested amount.
    #[error("not enough free points: need {requested}, have {balance}")]
    InsufficientFreePoints {
        /// Current spendable balance.
        balance: i32,
        /// Amount the user asked to spend.
        requested: i32,
    },

    /// A static catalog is missing or inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A transaction, connection, or deadline failure in the persistence layer.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The chat transport or relay refused a message.
    #[error("transport error: {0}")]
    Transport(String),
}

impl DomainError {
    /// Returns `true` for failures the operator must hear about: the user only
    /// sees a generic retry message for these.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::Persistence(_) | Self::Transport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_free_points_message_includes_balance() {
        let err = DomainError::InsufficientFreePoints {
            balance: 3,
            requested: 5,
        };
        assert_eq!(err.to_string(), "not enough free points: need 5, have 3");
    }

    #[test]
    fn test_operational_errors_are_persistence_configuration_and_transport() {
        assert!(DomainError::Persistence("db down".into()).is_operational());
        assert!(DomainError::Configuration("no templates".into()).is_operational());
        assert!(DomainError::Transport("closed".into()).is_operational());
        assert!(!DomainError::Validation("bad".into()).is_operational());
        assert!(!DomainError::UnknownStat("charisma".into()).is_operational());
        assert!(!DomainError::UserNotFound("ghost".into()).is_operational());
    }
}
