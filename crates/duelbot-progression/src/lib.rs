//! Duelbot — Progression bounded context.
//!
//! Responsible for player identity, duel results, bounded stats and the
//! free-points currency that gates stat increases. Persistence sits behind
//! the [`repository::ProgressionRepository`] port; the arithmetic lives in
//! [`domain::rules`] so every implementation applies the same rules.

pub mod application;
pub mod domain;
pub mod repository;
