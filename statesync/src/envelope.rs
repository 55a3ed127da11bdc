//! Framing of update messages.
//!
//! Both formats carry the same records: an address, an optional element
//! action and a value. Keyed dictionary records carry their action as the
//! last address ordinal and a key before the value. Each helper matches on the format once; GMQ frames
//! with a leading address length and a zero terminator, JSON wraps the
//! records in `{"changes":[ ... {}]}`.

use std::fmt;

use wire::{Composer, Parser, PrimitivesMut, WireResult};

use crate::error::{LimitKind, SyncError, SyncResult};
use crate::limits::SyncLimits;

/// What happens to a vector element named by an update record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ElementAction {
    /// Drop the element. No value follows.
    Remove = 1,
    /// Replace the element with the value.
    Update = 2,
    /// Insert the value before the addressed position.
    Insert = 3,
}

impl ElementAction {
    #[must_use]
    pub const fn code(self) -> u64 {
        self as u64
    }

    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Remove),
            2 => Some(Self::Update),
            3 => Some(Self::Insert),
            _ => None,
        }
    }

    /// Returns `true` if a value follows the action on the wire.
    #[must_use]
    pub const fn has_value(self) -> bool {
        !matches!(self, Self::Remove)
    }
}

impl fmt::Display for ElementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => write!(f, "remove"),
            Self::Update => write!(f, "update"),
            Self::Insert => write!(f, "insert"),
        }
    }
}

/// What happens to a dictionary entry named by a keyed update record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DictionaryAction {
    /// Drop the entry. No value follows the key.
    Remove = 1,
    /// Replace the value stored under an existing key.
    UpdateValue = 2,
    /// Add an entry under a new key.
    Insert = 3,
}

impl DictionaryAction {
    #[must_use]
    pub const fn code(self) -> u64 {
        self as u64
    }

    #[must_use]
    pub const fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(Self::Remove),
            2 => Some(Self::UpdateValue),
            3 => Some(Self::Insert),
            _ => None,
        }
    }

    #[must_use]
    pub const fn has_value(self) -> bool {
        !matches!(self, Self::Remove)
    }
}

impl fmt::Display for DictionaryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remove => write!(f, "remove"),
            Self::UpdateValue => write!(f, "update_value"),
            Self::Insert => write!(f, "insert"),
        }
    }
}

pub(crate) fn update_begin(composer: &mut Composer<'_>) {
    if let Composer::Json(c) = composer {
        c.raw("{\"changes\":[");
    }
}

pub(crate) fn update_end(composer: &mut Composer<'_>) {
    match composer {
        Composer::Gmq(c) => c.unsigned(0),
        Composer::Json(c) => c.raw("{}]}"),
    }
}

/// Opens a record; callers follow with [`value_begin`] and a value unless
/// the action is [`ElementAction::Remove`].
pub(crate) fn change_begin(
    composer: &mut Composer<'_>,
    address: &[u64],
    action: Option<ElementAction>,
) {
    match composer {
        Composer::Gmq(c) => {
            c.unsigned(address.len() as u64);
            for &ordinal in address {
                c.unsigned(ordinal);
            }
            if let Some(action) = action {
                c.unsigned(action.code());
            }
        }
        Composer::Json(c) => {
            c.raw("{\"addr\":[");
            for (index, &ordinal) in address.iter().enumerate() {
                if index > 0 {
                    c.raw(",");
                }
                c.unsigned(ordinal);
            }
            c.raw("]");
            if let Some(action) = action {
                c.raw(",\"action\":");
                c.unsigned(action.code());
            }
        }
    }
}

pub(crate) fn value_begin(composer: &mut Composer<'_>) {
    if let Composer::Json(c) = composer {
        c.raw(",\"value\":");
    }
}

pub(crate) fn key_begin(composer: &mut Composer<'_>) {
    if let Composer::Json(c) = composer {
        c.raw(",\"key\":");
    }
}

pub(crate) fn change_end(composer: &mut Composer<'_>) {
    if let Composer::Json(c) = composer {
        c.raw("},");
    }
}

pub(crate) fn parse_update_begin(parser: &mut Parser<'_>) -> WireResult<()> {
    match parser {
        Parser::Gmq(_) => Ok(()),
        Parser::Json(p) => {
            p.struct_begin()?;
            p.expect_key("changes")?;
            p.expect(b'[', "'['")
        }
    }
}

/// Reads the address of the next record, or `None` at the end of the update.
pub(crate) fn parse_change_address(
    parser: &mut Parser<'_>,
    limits: &SyncLimits,
) -> SyncResult<Option<Vec<u64>>> {
    let address = match parser {
        Parser::Gmq(p) => {
            let len = p.unsigned()?;
            if len == 0 {
                return Ok(None);
            }
            let len = check_address_len(usize::try_from(len).unwrap_or(usize::MAX), limits)?;
            let mut address = Vec::with_capacity(len);
            for _ in 0..len {
                address.push(p.unsigned()?);
            }
            address
        }
        Parser::Json(p) => {
            p.struct_begin()?;
            if p.is_delimiter(b'}') {
                p.struct_end()?;
                p.expect(b']', "']'")?;
                p.struct_end()?;
                return Ok(None);
            }
            p.expect_key("addr")?;
            let mut address = Vec::new();
            parser.parse_collection(&mut PrimitivesMut(&mut address))?;
            check_address_len(address.len(), limits)?;
            address
        }
    };
    if address.is_empty() {
        return Err(SyncError::InvalidAddress { address });
    }
    Ok(Some(address))
}

fn check_address_len(len: usize, limits: &SyncLimits) -> SyncResult<usize> {
    if len > limits.max_address_len {
        return Err(SyncError::LimitsExceeded {
            kind: LimitKind::AddressLength,
            limit: limits.max_address_len,
            actual: len,
        });
    }
    Ok(len)
}

pub(crate) fn parse_action(parser: &mut Parser<'_>) -> SyncResult<ElementAction> {
    let code = match parser {
        Parser::Gmq(p) => p.unsigned()?,
        Parser::Json(p) => {
            p.separator(true)?;
            p.expect_key("action")?;
            p.unsigned()?
        }
    };
    ElementAction::from_code(code).ok_or(SyncError::InvalidAction { action: code })
}

pub(crate) fn parse_key_begin(parser: &mut Parser<'_>) -> WireResult<()> {
    match parser {
        Parser::Gmq(_) => Ok(()),
        Parser::Json(p) => {
            p.separator(true)?;
            p.expect_key("key")
        }
    }
}

pub(crate) fn parse_value_begin(parser: &mut Parser<'_>) -> WireResult<()> {
    match parser {
        Parser::Gmq(_) => Ok(()),
        Parser::Json(p) => {
            p.separator(true)?;
            p.expect_key("value")
        }
    }
}

pub(crate) fn parse_change_end(parser: &mut Parser<'_>) -> WireResult<()> {
    match parser {
        Parser::Gmq(_) => Ok(()),
        Parser::Json(p) => {
            p.struct_end()?;
            p.separator(true)
        }
    }
}
