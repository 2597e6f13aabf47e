use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Custom epoch: Monday, January 1, 2024 00:00:00 UTC, in Unix milliseconds.
///
/// Every ID stores its timestamp as an offset from this instant, which leaves
/// roughly 69 years of range in the 41-bit field.
pub const EPOCH: u64 = 1_704_067_200_000;

/// [`EPOCH`] as a [`Duration`] since 1970-01-01 UTC.
pub const EPOCH_DURATION: Duration = Duration::from_millis(EPOCH);

/// A source of the current time in milliseconds since the Unix epoch.
///
/// Generators read the clock through this trait so that a real wall clock, a
/// monotonic ticker, or a mocked time source in tests can be plugged in.
///
/// # Example
///
/// ```
/// use nodeflake::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_706_000_000_123
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_706_000_000_123);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since 1970-01-01 UTC.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

/// The system wall clock.
///
/// Each call reads `SystemTime::now()`, so NTP corrections or manual clock
/// changes are visible to the generator and a backward step is reported as
/// [`Error::ClockRollback`].
///
/// [`Error::ClockRollback`]: crate::Error::ClockRollback
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock set before 1970 reads as 0 and is rejected by the encoder.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}
