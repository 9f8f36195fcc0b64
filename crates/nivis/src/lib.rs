//! Snowflake-style 64-bit id generation with explicit bit layouts and a
//! maintained clock.
//!
//! Ids pack four fields into one `u64` word: a timestamp (milliseconds
//! since a fixed epoch) in the high bits, then a partition id, a shard id,
//! and a per-millisecond sequence in the low bits. The timestamp,
//! partition and shard widths are chosen per deployment through
//! [`SnowflakeLayout`]; whatever remains of the 64 bits becomes the
//! sequence field.
//!
//! [`SnowflakeGenerator`] mints time-ordered [`Identity`] values under two
//! ordered locks and relies on an external caller of
//! [`SnowflakeGenerator::observe_clock`] to move time forward when a
//! millisecond window is spent. [`CounterGenerator`] is the unstructured
//! alternative: plain consecutive integers with no clock at all.
//!
//! # Example
//!
//! ```
//! use nivis::{SnowflakeGenerator, SnowflakeLayout, SystemClock};
//!
//! let layout = SnowflakeLayout::new(42, 5, 5)?;
//! let generator = SnowflakeGenerator::new(layout, 3, 7, SystemClock)?;
//!
//! let id = generator.generate()?;
//! assert_eq!(layout.partition_of(id), 3);
//! assert_eq!(layout.shard_of(id), 7);
//! # Ok::<(), nivis::Error>(())
//! ```

mod error;
mod generator;
mod id;
mod layout;
mod time;

pub use error::{Error, Result};
pub use generator::{CounterGenerator, SnowflakeGenerator};
pub use id::Identity;
pub use layout::SnowflakeLayout;
pub use time::{SERVICE_EPOCH, SystemClock, TimeSource};
