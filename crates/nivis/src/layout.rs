use crate::{Error, Identity, Result};

/// Bit allocation for snowflake-style ids.
///
/// A layout splits the 64-bit word into four contiguous fields, stacked
/// from the low end. For the reference `42/5/5` split (12 sequence bits):
///
/// ```text
///  63           22 21   17 16   12 11          0
/// +---------------+-------+-------+-------------+
/// |   timestamp   | part. | shard |  sequence   |
/// |    42 bits    | 5 bits| 5 bits|   12 bits   |
/// +---------------+-------+-------+-------------+
/// ```
///
/// The timestamp, partition and shard widths are chosen at construction;
/// whatever remains of the 64 bits becomes the sequence field. Field
/// bounds are exposed as exclusive capacities (`1 << bits`).
///
/// # Example
/// ```
/// use nivis::SnowflakeLayout;
///
/// let layout = SnowflakeLayout::new(42, 5, 5)?;
/// assert_eq!(layout.sequence_bits(), 12);
/// assert_eq!(layout.sequence_capacity(), 4096);
/// assert_eq!(layout.partition_shift(), 17);
/// # Ok::<(), nivis::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnowflakeLayout {
    timestamp_bits: u8,
    partition_bits: u8,
    shard_bits: u8,
    sequence_bits: u8,
}

impl SnowflakeLayout {
    /// Builds a layout from the three explicit field widths.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBitWidth`] unless the widths together occupy
    /// between 1 and 63 bits, so that at least one bit is left for the
    /// sequence field. A zero width for a single field is fine; that field
    /// then only ever holds the value 0.
    pub fn new(timestamp_bits: u8, partition_bits: u8, shard_bits: u8) -> Result<Self> {
        let used = timestamp_bits as u32 + partition_bits as u32 + shard_bits as u32;
        if used == 0 || used >= u64::BITS {
            return Err(Error::InvalidBitWidth {
                timestamp: timestamp_bits,
                partition: partition_bits,
                shard: shard_bits,
            });
        }

        Ok(Self {
            timestamp_bits,
            partition_bits,
            shard_bits,
            sequence_bits: (u64::BITS - used) as u8,
        })
    }

    /// Width of the timestamp field in bits.
    pub const fn timestamp_bits(&self) -> u8 {
        self.timestamp_bits
    }

    /// Width of the partition field in bits.
    pub const fn partition_bits(&self) -> u8 {
        self.partition_bits
    }

    /// Width of the shard field in bits.
    pub const fn shard_bits(&self) -> u8 {
        self.shard_bits
    }

    /// Width of the derived sequence field in bits.
    pub const fn sequence_bits(&self) -> u8 {
        self.sequence_bits
    }

    /// Bit position of the shard field.
    pub const fn shard_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    /// Bit position of the partition field.
    pub const fn partition_shift(&self) -> u32 {
        self.shard_shift() + self.shard_bits as u32
    }

    /// Bit position of the timestamp field.
    pub const fn timestamp_shift(&self) -> u32 {
        self.partition_shift() + self.partition_bits as u32
    }

    /// Exclusive upper bound of the timestamp field, in milliseconds since
    /// the generator's epoch.
    pub const fn timestamp_capacity(&self) -> u64 {
        1u64 << self.timestamp_bits
    }

    /// Exclusive upper bound for partition ids.
    pub const fn partition_capacity(&self) -> u64 {
        1u64 << self.partition_bits
    }

    /// Exclusive upper bound for shard ids.
    pub const fn shard_capacity(&self) -> u64 {
        1u64 << self.shard_bits
    }

    /// Number of ids a single millisecond window can hold.
    pub const fn sequence_capacity(&self) -> u64 {
        1u64 << self.sequence_bits
    }

    /// Packs field values into a single word. Every value is masked to its
    /// field width first.
    pub const fn pack(&self, elapsed: u64, partition: u64, shard: u64, sequence: u64) -> u64 {
        (elapsed & Self::mask(self.timestamp_bits)) << self.timestamp_shift()
            | (partition & Self::mask(self.partition_bits)) << self.partition_shift()
            | (shard & Self::mask(self.shard_bits)) << self.shard_shift()
            | (sequence & Self::mask(self.sequence_bits))
    }

    /// Timestamp field of an id packed with this layout, in milliseconds
    /// since the generator's epoch.
    pub const fn timestamp_of(&self, id: Identity) -> u64 {
        (id.value() >> self.timestamp_shift()) & Self::mask(self.timestamp_bits)
    }

    /// Partition field of an id packed with this layout.
    pub const fn partition_of(&self, id: Identity) -> u64 {
        (id.value() >> self.partition_shift()) & Self::mask(self.partition_bits)
    }

    /// Shard field of an id packed with this layout.
    pub const fn shard_of(&self, id: Identity) -> u64 {
        (id.value() >> self.shard_shift()) & Self::mask(self.shard_bits)
    }

    /// Sequence field of an id packed with this layout.
    pub const fn sequence_of(&self, id: Identity) -> u64 {
        id.value() & Self::mask(self.sequence_bits)
    }

    // Valid layouts keep every width below 64, so the shift cannot overflow.
    const fn mask(bits: u8) -> u64 {
        (1u64 << bits) - 1
    }
}
