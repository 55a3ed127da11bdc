//! Wire format selector.

use std::fmt;

/// The two wire representations every composer and parser speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Compact positional binary.
    Gmq,
    /// Human-readable JSON.
    Json,
}

impl WireFormat {
    /// Both formats, for tests that must cover each.
    pub const ALL: [Self; 2] = [Self::Gmq, Self::Json];
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Gmq => "gmq",
            Self::Json => "json",
        };
        write!(f, "{name}")
    }
}
