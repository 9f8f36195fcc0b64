use crate::Identity;
use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free increasing-integer id generator.
///
/// Ids are plain consecutive integers with no embedded structure: no
/// timestamp, no partition or shard identity. Unlike
/// [`SnowflakeGenerator`] the counter has no clock, so it needs no
/// maintenance and can never fail; in exchange its ids are only unique
/// within the owning process.
///
/// # Example
/// ```
/// use nivis::CounterGenerator;
///
/// let generator = CounterGenerator::new();
/// assert_eq!(generator.generate().value(), 0);
/// assert_eq!(generator.generate().value(), 1);
/// ```
///
/// [`SnowflakeGenerator`]: crate::SnowflakeGenerator
#[derive(Debug, Default)]
pub struct CounterGenerator {
    next: AtomicU64,
}

impl CounterGenerator {
    /// Creates a counter that starts at 0.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
        }
    }

    /// Creates a counter that resumes from a previously issued point, e.g.
    /// after restoring state from storage.
    pub const fn starting_at(next: u64) -> Self {
        Self {
            next: AtomicU64::new(next),
        }
    }

    /// Mints the next id. Never fails and never blocks.
    pub fn generate(&self) -> Identity {
        Identity::from_raw(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
