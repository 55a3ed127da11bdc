//! GMQ binary format.
//!
//! Fields are positional: struct markers, names and separators write nothing.
//! Integers are VLQ (signed ones zig-zag mapped first), reals are 8-byte
//! little-endian IEEE 754, strings and collections carry a VLQ length prefix.

use buffer::{read_vlq, write_vlq, zigzag_decode, zigzag_encode, ByteBuffer, ReadCursor};

use crate::error::{FormatReason, LimitKind, WireError, WireResult};
use crate::limits::Limits;

/// Binary composer appending to a borrowed buffer.
#[derive(Debug)]
pub struct GmqComposer<'a> {
    buf: &'a mut ByteBuffer,
}

impl<'a> GmqComposer<'a> {
    #[must_use]
    pub fn new(buf: &'a mut ByteBuffer) -> Self {
        Self { buf }
    }

    pub fn signed(&mut self, value: i64) {
        write_vlq(self.buf, zigzag_encode(value));
    }

    pub fn unsigned(&mut self, value: u64) {
        write_vlq(self.buf, value);
    }

    pub fn real(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn string(&mut self, value: &str) {
        write_vlq(self.buf, value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn collection_begin(&mut self, size: usize) {
        write_vlq(self.buf, size as u64);
    }
}

/// Binary parser over a read cursor.
#[derive(Debug, Clone)]
pub struct GmqParser<'a> {
    cursor: ReadCursor<'a>,
    limits: Limits,
}

impl<'a> GmqParser<'a> {
    #[must_use]
    pub fn new(cursor: ReadCursor<'a>, limits: Limits) -> Self {
        Self { cursor, limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    #[must_use]
    pub const fn cursor(&self) -> &ReadCursor<'a> {
        &self.cursor
    }

    pub fn signed(&mut self) -> WireResult<i64> {
        Ok(zigzag_decode(read_vlq(&mut self.cursor)?))
    }

    pub fn unsigned(&mut self) -> WireResult<u64> {
        Ok(read_vlq(&mut self.cursor)?)
    }

    pub fn real(&mut self) -> WireResult<f64> {
        Ok(f64::from_le_bytes(self.cursor.read_array::<8>()?))
    }

    pub fn string(&mut self) -> WireResult<String> {
        let len = self.length(LimitKind::StringBytes, self.limits.max_string_bytes)?;
        let position = self.cursor.position();
        let bytes = self.cursor.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| WireError::BadFormat {
            position,
            reason: FormatReason::InvalidUtf8,
        })
    }

    /// Reads a collection count and checks it against the limits.
    pub fn collection_begin(&mut self) -> WireResult<usize> {
        self.length(LimitKind::CollectionLength, self.limits.max_collection_len)
    }

    fn length(&mut self, kind: LimitKind, limit: usize) -> WireResult<usize> {
        let raw = read_vlq(&mut self.cursor)?;
        let actual = usize::try_from(raw).unwrap_or(usize::MAX);
        if actual > limit {
            return Err(WireError::LimitsExceeded {
                kind,
                limit,
                actual,
            });
        }
        Ok(actual)
    }
}
