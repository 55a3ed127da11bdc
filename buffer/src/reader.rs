//! Bounds-checked read cursor.

use crate::error::{BufError, BufResult};

/// A read cursor over a completed byte sequence.
///
/// Cursors borrow the bytes immutably, so several of them may iterate one
/// buffer independently. All reads are bounds-checked and the cursor never
/// panics on malformed input.
#[derive(Debug, Clone)]
pub struct ReadCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    /// Creates a cursor at the start of `data`.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` once the position reaches the end of the data.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the next byte without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> BufResult<u8> {
        let byte = self.peek().ok_or(BufError::UnexpectedEof {
            requested: 1,
            available: 0,
        })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Reads `len` bytes as a borrowed slice.
    pub fn read_bytes(&mut self, len: usize) -> BufResult<&'a [u8]> {
        self.ensure(len)?;
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Reads exactly `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> BufResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn ensure(&self, len: usize) -> BufResult<()> {
        let available = self.remaining();
        if len > available {
            return Err(BufError::UnexpectedEof {
                requested: len,
                available,
            });
        }
        Ok(())
    }
}
