//! Application layer for the Duel context.

pub mod coordinator;
