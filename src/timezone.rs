//! Wall-clock resolution for shift classification.
//!
//! Night, weekend, and holiday classification operate on local wall time.
//! The host application owns the timezone database; this module only
//! defines the seam and a fixed-offset implementation.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

/// Resolves UTC instants to local wall time.
///
/// Implement this with a proper timezone database (DST-aware) in the host;
/// [`FixedOffsetClock`] is sufficient for tests and single-offset
/// deployments.
pub trait LocalClock: Send + Sync {
    /// Converts a UTC instant to local wall time.
    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime;
}

/// A [`LocalClock`] applying one fixed UTC offset.
///
/// # Example
///
/// ```
/// use cao_engine::timezone::{FixedOffsetClock, LocalClock};
/// use chrono::{TimeZone, Timelike, Utc};
///
/// let cet = FixedOffsetClock::east_hours(1);
/// let instant = Utc.with_ymd_and_hms(2025, 1, 15, 21, 30, 0).unwrap();
/// assert_eq!(cet.to_local(instant).hour(), 22);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedOffsetClock {
    offset: FixedOffset,
}

impl FixedOffsetClock {
    /// Creates a clock with the given fixed offset.
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Creates a clock at the given whole-hour offset east of UTC.
    pub fn east_hours(hours: i32) -> Self {
        // 24h east/west is out of range for FixedOffset; whole hours in
        // (-24, 24) always construct.
        let offset = FixedOffset::east_opt(hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset"));
        Self { offset }
    }

    /// Central European (winter) time, the default for Dutch deployments.
    pub fn cet() -> Self {
        Self::east_hours(1)
    }
}

impl Default for FixedOffsetClock {
    fn default() -> Self {
        Self::cet()
    }
}

impl LocalClock for FixedOffsetClock {
    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }
}

/// A [`LocalClock`] treating UTC as local time, for tests and fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcClock;

impl LocalClock for UtcClock {
    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.naive_utc()
    }
}
