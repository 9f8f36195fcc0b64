use crate::{Error, Identity, Result, SERVICE_EPOCH, SnowflakeLayout, TimeSource};
use core::cmp::Ordering;
use parking_lot::{Condvar, Mutex};
use std::time::Duration;

/// Re-check interval while a caller waits out a spent sequence window.
const SEQUENCE_WAIT: Duration = Duration::from_millis(1);

/// A snowflake-style id generator guarded by two ordered locks.
///
/// State splits across two [`Mutex`]es: the per-window sequence counter and
/// the wall-clock reading (in milliseconds) of the window currently being
/// issued from. [`generate`] always acquires the sequence lock first and
/// the timestamp lock second; [`observe_clock`] takes only the timestamp
/// lock. The split lets a clock maintenance routine keep the timestamp
/// fresh while a caller sits out a spent window without losing its place
/// in line.
///
/// The generator never advances its own clock while waiting: when a
/// millisecond window is spent, the caller blocks until something stores a
/// newer reading via [`observe_clock`]. Run one maintenance routine per
/// generator (as `nivis-service` does), or call [`observe_clock`] from a
/// background thread of your own.
///
/// # Example
/// ```
/// use nivis::{SnowflakeGenerator, SnowflakeLayout, SystemClock};
///
/// let layout = SnowflakeLayout::new(42, 5, 5)?;
/// let generator = SnowflakeGenerator::new(layout, 3, 7, SystemClock)?;
///
/// let id = generator.generate()?;
/// assert_eq!(layout.partition_of(id), 3);
/// assert_eq!(layout.shard_of(id), 7);
/// # Ok::<(), nivis::Error>(())
/// ```
///
/// [`generate`]: Self::generate
/// [`observe_clock`]: Self::observe_clock
#[derive(Debug)]
pub struct SnowflakeGenerator<T>
where
    T: TimeSource,
{
    layout: SnowflakeLayout,
    partition_id: u64,
    shard_id: u64,
    epoch_ms: u64,
    time: T,
    /// Locked first by `generate`.
    sequence: Mutex<u64>,
    /// Locked second by `generate`; the only lock `observe_clock` takes.
    timestamp: Mutex<u64>,
    clock_advanced: Condvar,
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator anchored to [`SERVICE_EPOCH`].
    ///
    /// `partition_id` and `shard_id` are checked against the layout and
    /// encoded into every id. The initial window is read from `clock`.
    ///
    /// # Errors
    /// Returns [`Error::PartitionIdOutOfRange`] or
    /// [`Error::ShardIdOutOfRange`] when an id does not fit its field.
    pub fn new(layout: SnowflakeLayout, partition_id: u64, shard_id: u64, clock: T) -> Result<Self> {
        Self::with_epoch(layout, partition_id, shard_id, SERVICE_EPOCH, clock)
    }

    /// Creates a generator anchored to a custom epoch, given as an offset
    /// from the Unix epoch.
    ///
    /// All ids from one deployment must share an epoch, or their timestamp
    /// fields stop being comparable.
    ///
    /// # Errors
    /// Same validation as [`Self::new`].
    pub fn with_epoch(
        layout: SnowflakeLayout,
        partition_id: u64,
        shard_id: u64,
        epoch: Duration,
        clock: T,
    ) -> Result<Self> {
        if partition_id >= layout.partition_capacity() {
            return Err(Error::PartitionIdOutOfRange {
                id: partition_id,
                max: layout.partition_capacity(),
            });
        }
        if shard_id >= layout.shard_capacity() {
            return Err(Error::ShardIdOutOfRange {
                id: shard_id,
                max: layout.shard_capacity(),
            });
        }

        let now = clock.current_millis();
        Ok(Self {
            layout,
            partition_id,
            shard_id,
            epoch_ms: epoch.as_millis() as u64,
            time: clock,
            sequence: Mutex::new(0),
            timestamp: Mutex::new(now),
            clock_advanced: Condvar::new(),
        })
    }

    /// The layout ids are packed with.
    pub const fn layout(&self) -> SnowflakeLayout {
        self.layout
    }

    /// Partition id encoded into every id.
    pub const fn partition_id(&self) -> u64 {
        self.partition_id
    }

    /// Shard id encoded into every id.
    pub const fn shard_id(&self) -> u64 {
        self.shard_id
    }

    /// Mints the next id.
    ///
    /// The wall clock is compared against the window the generator last
    /// issued from: a newer reading opens a fresh window at sequence 0, the
    /// same reading takes the next sequence slot. When the sequence field
    /// wraps, the call parks on the internal condvar, releasing only the
    /// timestamp lock, until a maintenance routine stores a reading past
    /// the spent window.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] when the wall clock reads earlier than
    ///   the last issued window. State is left untouched, so calls succeed
    ///   again once the clock catches back up.
    /// - [`Error::ClockExhausted`] once the time elapsed since the epoch no
    ///   longer fits the timestamp field. This is permanent for a given
    ///   epoch and layout; a clock reading from before the epoch lands here
    ///   as well.
    pub fn generate(&self) -> Result<Identity> {
        // Lock order: sequence first, then timestamp. `observe_clock`
        // takes only the timestamp lock.
        let mut sequence = self.sequence.lock();
        let mut timestamp = self.timestamp.lock();

        let now = self.time.current_millis();
        match now.cmp(&*timestamp) {
            Ordering::Less => {
                return Err(Error::ClockRegression {
                    last_ms: *timestamp,
                    now_ms: now,
                });
            }
            Ordering::Equal => {
                *sequence += 1;
                if *sequence >= self.layout.sequence_capacity() {
                    *sequence = 0;
                    // Window spent. The sequence lock stays held so no other
                    // caller slips in; the timestamp lock is released while
                    // parked. The bounded wait covers a missed notify.
                    while *timestamp <= now {
                        let _ = self.clock_advanced.wait_for(&mut timestamp, SEQUENCE_WAIT);
                    }
                }
            }
            Ordering::Greater => {
                *timestamp = now;
                *sequence = 0;
            }
        }

        let elapsed = (*timestamp).wrapping_sub(self.epoch_ms);
        if elapsed >= self.layout.timestamp_capacity() {
            return Err(Error::ClockExhausted {
                elapsed_ms: elapsed,
                capacity_ms: self.layout.timestamp_capacity(),
            });
        }

        Ok(Identity::from_raw(self.layout.pack(
            elapsed,
            self.partition_id,
            self.shard_id,
            *sequence,
        )))
    }

    /// Stores a fresh clock reading into the timestamp slot and wakes any
    /// caller waiting out a spent sequence window.
    ///
    /// This is the entry point for the clock maintenance routine. It takes
    /// only the timestamp lock, and only briefly, so it can run alongside
    /// `generate` callers without ever touching the sequence side.
    pub fn observe_clock(&self) {
        let mut timestamp = self.timestamp.lock();
        // Read under the lock: a store from a reading taken earlier could
        // land after a newer window was already issued from and re-open it.
        *timestamp = self.time.current_millis();
        self.clock_advanced.notify_all();
    }
}
