//! Duelbot — PostgreSQL persistence for the Progression context.

pub mod migrations;
pub mod pg_progression_repository;

pub use pg_progression_repository::PgProgressionRepository;
