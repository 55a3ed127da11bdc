//! Error types for buffer operations.

use std::fmt;

/// Result type for buffer operations.
pub type BufResult<T> = Result<T, BufError>;

/// Errors that can occur while reading from a [`crate::ReadCursor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A VLQ sequence did not terminate within 10 bytes or overflowed 64 bits.
    InvalidVlq,
}

impl fmt::Display for BufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::InvalidVlq => write!(f, "malformed VLQ: unterminated or wider than 64 bits"),
        }
    }
}

impl std::error::Error for BufError {}
