//! Duelbot Core — shared abstractions.
//!
//! This crate defines the error type, determinism seams (clock and RNG),
//! the command marker trait, and the chat/relay transport ports that the
//! bounded contexts and the bot binary depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod rng;
pub mod transport;
