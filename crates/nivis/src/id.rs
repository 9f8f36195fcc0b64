use core::fmt;

/// A generated identifier.
///
/// `Identity` wraps the packed 64-bit word produced by a generator. The
/// value is opaque: how the bits split into fields is decided by the
/// [`SnowflakeLayout`] of the generator that minted it, and counter ids use
/// the whole word. Equality, ordering and hashing follow the raw word, so
/// ids from a single generator sort by mint order.
///
/// [`SnowflakeLayout`]: crate::SnowflakeLayout
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identity(u64);

impl Identity {
    /// Wraps a raw 64-bit word, e.g. one read back from storage.
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the packed 64-bit word.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Returns the id as a zero-padded 20-digit decimal string.
    ///
    /// Unlike [`Display`], the padded form is lexicographically sortable:
    /// comparing two padded strings byte-wise agrees with comparing the
    /// numeric values.
    ///
    /// # Example
    /// ```
    /// use nivis::Identity;
    ///
    /// let id = Identity::from_raw(42);
    /// assert_eq!(id.to_padded_string(), "00000000000000000042");
    /// ```
    ///
    /// [`Display`]: core::fmt::Display
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.0)
    }
}

impl fmt::Display for Identity {
    /// Formats the id as a plain base-10 integer without padding.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Identity;

    #[test]
    fn renders_as_plain_decimal() {
        let id = Identity::from_raw(1_234_567_890);
        assert_eq!(id.value(), 1_234_567_890);
        assert_eq!(id.to_string(), "1234567890");
    }

    #[test]
    fn padded_strings_sort_like_values() {
        let small = Identity::from_raw(99);
        let large = Identity::from_raw(100);
        assert_eq!(small.to_padded_string().len(), 20);
        assert!(small.to_padded_string() < large.to_padded_string());
    }

    #[test]
    fn ordering_follows_the_packed_word() {
        assert!(Identity::from_raw(1) < Identity::from_raw(2));
        assert_eq!(Identity::from_raw(7), Identity::from_raw(7));
    }
}
