//! Wall-clock seam: row timestamps and relay notice stamps go through it.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time, used for row timestamps and operator
/// notices. Duel timers run on the async runtime's monotonic clock instead.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as `HH:MM:SS`, the prefix used on relay notices.
    fn stamp(&self) -> String {
        self.now().format("%H:%M:%S").to_string()
    }
}

/// `Utc::now()`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Frozen;

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2026, 3, 4, 7, 5, 9).unwrap()
        }
    }

    #[test]
    fn test_stamp_is_zero_padded_time_of_day() {
        assert_eq!(Frozen.stamp(), "07:05:09");
    }
}
