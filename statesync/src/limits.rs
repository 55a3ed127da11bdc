//! Limits for applying state updates.

/// Bounds checked while a subscriber applies an update message.
///
/// Wire-level limits (collection lengths, string sizes) are carried by the
/// parser itself; these cover the update framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLimits {
    /// Maximum number of ordinals in one change address.
    pub max_address_len: usize,

    /// Maximum number of change records in one update message.
    pub max_changes_per_update: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            max_address_len: 64,
            max_changes_per_update: 64 * 1024,
        }
    }
}

impl SyncLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_address_len: 8,
            max_changes_per_update: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_address_len: usize::MAX,
            max_changes_per_update: usize::MAX,
        }
    }
}
