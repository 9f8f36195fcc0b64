use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Service epoch: Saturday, July 27, 2024 00:00:00 UTC.
///
/// Timestamp fields count milliseconds from this instant, which gives the
/// reference 42-bit layout roughly 139 years of headroom.
pub const SERVICE_EPOCH: Duration = Duration::from_millis(1_722_038_400_000);

/// A source of wall-clock time for id generators.
///
/// Implementations return **milliseconds since the Unix epoch**; generators
/// subtract their own epoch when forming the timestamp field. Production
/// code uses [`SystemClock`], tests substitute fixed or hand-stepped
/// sources.
///
/// # Example
///
/// ```
/// use nivis::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

/// [`TimeSource`] backed by [`SystemTime`].
///
/// A system clock set before 1970 reads as 0.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_millis() as u64)
    }
}
