//! Duelbot — chat bot library: configuration, command router, chat
//! commands, dispatcher and the HTTP chat bridge.

pub mod commands;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod metadata;
pub mod outbox;
pub mod relay;
pub mod router;
pub mod routes;
pub mod state;
