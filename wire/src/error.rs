//! Error types for composing, parsing and dispatch.

use std::fmt;

use buffer::BufError;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while composing or parsing a message.
///
/// A failed parse leaves the cursor at an unspecified position; callers drop
/// the message rather than attempt to resynchronize.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// Input ended early or a VLQ was malformed.
    Truncated(BufError),

    /// A JSON structural expectation was violated, or binary string bytes were not UTF-8.
    BadFormat {
        /// Byte offset in the input where the problem was detected.
        position: usize,
        /// What was wrong.
        reason: FormatReason,
    },

    /// A decoded number does not fit the requested type.
    ValueOutOfRange { target: &'static str },

    /// NaN and infinities have no JSON representation.
    NonFiniteReal,

    /// No handler matched the message id and no fallback was registered.
    UnmatchedMessageId { msg_id: u64 },

    /// A parsed dictionary repeats a key.
    DuplicateKey { ordinal: usize },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific parse limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    CollectionLength,
    StringBytes,
}

/// Detail for [`WireError::BadFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatReason {
    UnexpectedByte { expected: &'static str, found: u8 },
    KeyMismatch { expected: String, found: String },
    InvalidNumber,
    InvalidEscape,
    InvalidUtf8,
    ControlCharacter,
    SizeMismatch { declared: usize, actual: usize },
}

/// Errors raised while building a [`crate::HandlerTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// More than one fallback handler was supplied.
    DuplicateFallbackHandler,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truncated(err) => write!(f, "truncated input: {err}"),
            Self::BadFormat { position, reason } => {
                write!(f, "bad format at byte {position}: {reason}")
            }
            Self::ValueOutOfRange { target } => {
                write!(f, "decoded value out of range for {target}")
            }
            Self::NonFiniteReal => write!(f, "non-finite real cannot be written as JSON"),
            Self::UnmatchedMessageId { msg_id } => {
                write!(f, "no handler for message id {msg_id}")
            }
            Self::DuplicateKey { ordinal } => {
                write!(f, "dictionary entry {ordinal} repeats an earlier key")
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
            Self::CollectionLength => "collection length",
            Self::StringBytes => "string bytes",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for FormatReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedByte { expected, found } => {
                write!(f, "expected {expected}, found {:?}", char::from(*found))
            }
            Self::KeyMismatch { expected, found } => {
                write!(f, "expected key \"{expected}\", found \"{found}\"")
            }
            Self::InvalidNumber => write!(f, "invalid number literal"),
            Self::InvalidEscape => write!(f, "invalid string escape"),
            Self::InvalidUtf8 => write!(f, "string is not valid UTF-8"),
            Self::ControlCharacter => write!(f, "unescaped control character in string"),
            Self::SizeMismatch { declared, actual } => {
                write!(f, "collection declared size {declared} but held {actual}")
            }
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateFallbackHandler => {
                write!(f, "handler table has more than one fallback handler")
            }
        }
    }
}

impl std::error::Error for WireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Truncated(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<BufError> for WireError {
    fn from(err: BufError) -> Self {
        Self::Truncated(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_display_wraps_buffer_error() {
        let err = WireError::from(BufError::UnexpectedEof {
            requested: 1,
            available: 0,
        });
        let msg = err.to_string();
        assert!(msg.contains("truncated"));
        assert!(msg.contains("1 bytes"));
    }

    #[test]
    fn bad_format_display_key_mismatch() {
        let err = WireError::BadFormat {
            position: 3,
            reason: FormatReason::KeyMismatch {
                expected: "msgid".to_string(),
                found: "id".to_string(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("byte 3"));
        assert!(msg.contains("\"msgid\""));
        assert!(msg.contains("\"id\""));
    }

    #[test]
    fn limits_exceeded_display() {
        let err = WireError::LimitsExceeded {
            kind: LimitKind::StringBytes,
            limit: 4,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("string bytes"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn unexpected_byte_display() {
        let reason = FormatReason::UnexpectedByte {
            expected: "','",
            found: b'x',
        };
        assert!(reason.to_string().contains("'x'"));
    }

    #[test]
    fn truncated_has_source() {
        use std::error::Error;
        let err = WireError::Truncated(BufError::InvalidVlq);
        assert!(err.source().is_some());
        assert!(WireError::NonFiniteReal.source().is_none());
    }

    #[test]
    fn dispatch_error_display() {
        let msg = DispatchError::DuplicateFallbackHandler.to_string();
        assert!(msg.contains("fallback"));
    }
}
