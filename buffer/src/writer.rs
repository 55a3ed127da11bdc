//! Append-only byte buffer.

use std::io::{self, Read, Write};

use crate::reader::ReadCursor;

/// An owned, growable byte sequence that composers append to.
///
/// Reading goes through [`ReadCursor`], so any number of readers may walk one
/// completed buffer at the same time. Equality is byte-content equality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the written bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Appends a single byte.
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Appends a byte slice.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Shortens the buffer to `len` bytes. Has no effect if `len` is not
    /// shorter than the current length.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Discards all bytes, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Consumes the buffer and returns its bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    /// Returns a fresh cursor positioned at the first byte.
    #[must_use]
    pub fn read_cursor(&self) -> ReadCursor<'_> {
        ReadCursor::new(&self.bytes)
    }

    /// Writes the whole buffer to a sink.
    pub fn write_to<W: Write>(&self, mut sink: W) -> io::Result<()> {
        sink.write_all(&self.bytes)?;
        sink.flush()
    }

    /// Reads a source to its end into a new buffer.
    pub fn read_from<R: Read>(mut source: R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;
        Ok(Self { bytes })
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl AsRef<[u8]> for ByteBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
