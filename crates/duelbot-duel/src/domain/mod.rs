//! Domain layer for the Duel context.

pub mod arena;
pub mod messages;
pub mod outcome;
pub mod templates;
