/// Errors produced while configuring or running the id generators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested field widths do not leave room for a sequence field
    /// inside the 64-bit word.
    #[error(
        "invalid bit widths {timestamp}/{partition}/{shard}: the three fields must together occupy between 1 and 63 bits"
    )]
    InvalidBitWidth {
        timestamp: u8,
        partition: u8,
        shard: u8,
    },

    /// The partition id does not fit the configured partition field.
    #[error("partition id {id} does not fit its field (must be < {max})")]
    PartitionIdOutOfRange { id: u64, max: u64 },

    /// The shard id does not fit the configured shard field.
    #[error("shard id {id} does not fit its field (must be < {max})")]
    ShardIdOutOfRange { id: u64, max: u64 },

    /// The wall clock reads earlier than the last issued window.
    #[error("clock moved backwards: last issued window at {last_ms} ms, clock reads {now_ms} ms")]
    ClockRegression { last_ms: u64, now_ms: u64 },

    /// The elapsed time since the epoch no longer fits the timestamp field.
    #[error("timestamp exhausted: {elapsed_ms} ms since the epoch, field capacity {capacity_ms} ms")]
    ClockExhausted { elapsed_ms: u64, capacity_ms: u64 },
}

/// Canonical result type for this crate.
pub type Result<T> = core::result::Result<T, Error>;
