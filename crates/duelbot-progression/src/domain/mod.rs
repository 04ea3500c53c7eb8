//! Domain layer for the Progression context.

pub mod commands;
pub mod labels;
pub mod model;
pub mod rules;
