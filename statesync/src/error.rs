//! Error types for publishing and applying state.

use std::fmt;

use wire::WireError;

use crate::types::NodeId;

/// Result type for state sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised by [`crate::Publisher`] and [`crate::Subscriber`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// Composing or parsing failed.
    Wire(WireError),

    /// A mutation was attempted outside `start_tick` / `end_tick`.
    TickNotStarted,

    /// A field path named a field the schema does not have.
    UnknownField { path: String },

    /// A node id does not belong to this publisher.
    UnknownNode { node: NodeId },

    /// A value does not match the declared type.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// An update addressed a field that does not exist.
    InvalidAddress { address: Vec<u64> },

    /// An update carried an unknown vector or dictionary action.
    InvalidAction { action: u64 },

    /// A vector index is past the end.
    IndexOutOfRange { index: u64, len: usize },

    /// A dictionary insert named a key that is already present.
    KeyExists { key: String },

    /// A dictionary update or removal named a key that is not present.
    KeyNotFound { key: String },

    /// The peer's schema fingerprint differs from ours.
    SchemaMismatch { expected: u64, found: u64 },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific state sync limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    AddressLength,
    ChangesPerUpdate,
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wire(err) => write!(f, "wire error: {err}"),
            Self::TickNotStarted => write!(f, "mutation outside of a tick"),
            Self::UnknownField { path } => write!(f, "unknown field '{path}'"),
            Self::UnknownNode { node } => write!(f, "unknown node {}", node.raw()),
            Self::TypeMismatch { expected, found } => {
                write!(f, "type mismatch: expected {expected}, found {found}")
            }
            Self::InvalidAddress { address } => write!(f, "invalid address {address:?}"),
            Self::InvalidAction { action } => write!(f, "invalid element action {action}"),
            Self::KeyExists { key } => write!(f, "dictionary key {key} already present"),
            Self::KeyNotFound { key } => write!(f, "dictionary key {key} not found"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for vector of length {len}")
            }
            Self::SchemaMismatch { expected, found } => {
                write!(
                    f,
                    "schema mismatch: expected 0x{expected:016X}, found 0x{found:016X}"
                )
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddressLength => "address length",
            Self::ChangesPerUpdate => "changes per update",
        };
        write!(f, "{name}")
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Wire(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WireError> for SyncError {
    fn from(err: WireError) -> Self {
        Self::Wire(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_index_out_of_range() {
        let err = SyncError::IndexOutOfRange { index: 7, len: 3 };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('3'));
    }

    #[test]
    fn display_schema_mismatch_is_hex() {
        let err = SyncError::SchemaMismatch {
            expected: 0xAB,
            found: 0xCD,
        };
        let msg = err.to_string();
        assert!(msg.contains("00000000000000AB"));
        assert!(msg.contains("00000000000000CD"));
    }

    #[test]
    fn wire_error_converts() {
        let err: SyncError = WireError::NonFiniteReal.into();
        assert_eq!(err, SyncError::Wire(WireError::NonFiniteReal));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn limits_display() {
        let err = SyncError::LimitsExceeded {
            kind: LimitKind::AddressLength,
            limit: 8,
            actual: 9,
        };
        assert!(err.to_string().contains("address length"));
    }
}
