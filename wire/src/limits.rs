//! Configurable limits for bounded parsing.

/// Parse limits.
///
/// Declared counts and string lengths are checked against these before any
/// allocation, so a hostile length prefix cannot force a large reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of elements in one collection.
    pub max_collection_len: usize,

    /// Maximum decoded length of one string, in bytes.
    pub max_string_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_collection_len: 1 << 20,
            max_string_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_collection_len: 256,
            max_string_bytes: 1024,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_collection_len: usize::MAX,
            max_string_bytes: usize::MAX,
        }
    }
}
