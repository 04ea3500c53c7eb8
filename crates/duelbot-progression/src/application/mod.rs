//! Application layer for the Progression context.

pub mod command_handlers;
