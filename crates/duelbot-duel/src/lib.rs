//! Duelbot — Duel bounded context.
//!
//! Responsible for the challenge → accept/expire → cooldown protocol, the
//! roll that decides a duel, and the flavor text announcing it. Results are
//! handed to the Progression context for bookkeeping.

pub mod application;
pub mod domain;
