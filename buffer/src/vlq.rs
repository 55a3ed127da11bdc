//! Variable-length quantity and zig-zag integer coding.
//!
//! A VLQ stores an unsigned integer as little-endian 7-bit groups. Every byte
//! but the last has its high bit set. Signed integers are zig-zag mapped first
//! so values of small magnitude stay short regardless of sign.

use crate::error::{BufError, BufResult};
use crate::reader::ReadCursor;
use crate::writer::ByteBuffer;

/// Longest encoding of a `u64`: `ceil(64 / 7)` groups.
pub const VLQ_MAX_BYTES: usize = 10;

/// Appends the minimal-length VLQ encoding of `value`.
pub fn write_vlq(buf: &mut ByteBuffer, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Reads one VLQ.
///
/// Fails with [`BufError::UnexpectedEof`] if the data ends before a terminating
/// byte and with [`BufError::InvalidVlq`] if the sequence runs past
/// [`VLQ_MAX_BYTES`] or carries bits above bit 63.
pub fn read_vlq(cursor: &mut ReadCursor<'_>) -> BufResult<u64> {
    let mut result = 0u64;
    for index in 0..VLQ_MAX_BYTES {
        let byte = cursor.read_u8()?;
        let payload = u64::from(byte & 0x7F);
        if index == VLQ_MAX_BYTES - 1 && payload > 1 {
            return Err(BufError::InvalidVlq);
        }
        result |= payload << (7 * index);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
    }
    Err(BufError::InvalidVlq)
}

/// Number of bytes [`write_vlq`] emits for `value`.
#[must_use]
pub const fn vlq_len(value: u64) -> usize {
    if value == 0 {
        1
    } else {
        (64 - value.leading_zeros() as usize + 6) / 7
    }
}

/// Maps a signed integer onto the unsigned range: `0, -1, 1, -2, ...` become `0, 1, 2, 3, ...`.
#[must_use]
pub const fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
#[must_use]
pub const fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: u64) -> Vec<u8> {
        let mut buf = ByteBuffer::new();
        write_vlq(&mut buf, value);
        buf.into_vec()
    }

    #[test]
    fn known_encodings() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(encode(1), vec![0x01]);
        assert_eq!(encode(127), vec![0x7F]);
        assert_eq!(encode(128), vec![0x80, 0x01]);
        assert_eq!(encode(300), vec![0xAC, 0x02]);
        assert_eq!(
            encode(u64::MAX),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn vlq_len_matches_encoding() {
        for value in [0, 1, 2, 126, 127, 128, 16_383, 16_384, u64::MAX >> 1, u64::MAX] {
            assert_eq!(vlq_len(value), encode(value).len(), "value {value}");
        }
    }

    #[test]
    fn truncated_vlq_fails() {
        let mut cursor = ReadCursor::new(&[0x80, 0x80]);
        let err = read_vlq(&mut cursor).unwrap_err();
        assert!(matches!(err, BufError::UnexpectedEof { .. }));
    }

    #[test]
    fn overlong_vlq_fails() {
        let bytes = [0x80; 11];
        let mut cursor = ReadCursor::new(&bytes);
        assert_eq!(read_vlq(&mut cursor).unwrap_err(), BufError::InvalidVlq);
    }

    #[test]
    fn tenth_byte_overflow_fails() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x02];
        let mut cursor = ReadCursor::new(&bytes);
        assert_eq!(read_vlq(&mut cursor).unwrap_err(), BufError::InvalidVlq);
    }

    #[test]
    fn redundant_zero_group_is_tolerated() {
        let mut cursor = ReadCursor::new(&[0x81, 0x00]);
        assert_eq!(read_vlq(&mut cursor).unwrap(), 1);
    }

    #[test]
    fn zigzag_known_values() {
        assert_eq!(zigzag_encode(0), 0);
        assert_eq!(zigzag_encode(-1), 1);
        assert_eq!(zigzag_encode(1), 2);
        assert_eq!(zigzag_encode(-2), 3);
        assert_eq!(zigzag_encode(i64::MAX), u64::MAX - 1);
        assert_eq!(zigzag_encode(i64::MIN), u64::MAX);
    }

    #[test]
    fn zigzag_boundaries_roundtrip() {
        for value in [0, 1, -1, 2, 126, 127, -127, 128, -128, i64::MAX, i64::MIN] {
            assert_eq!(zigzag_decode(zigzag_encode(value)), value, "value {value}");
        }
    }
}
