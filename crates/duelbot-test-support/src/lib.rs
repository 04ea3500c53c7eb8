//! Shared test doubles and utilities for duelbot.

mod clock;
mod repository;
mod rng;
mod transport;

pub use clock::{FixedClock, fixed_clock};
pub use repository::{FailingProgressionRepository, InMemoryProgressionRepository, default_catalog};
pub use rng::{MockRng, SequenceRng};
pub use transport::{FailingTransport, RecordingRelay, RecordingTransport};
