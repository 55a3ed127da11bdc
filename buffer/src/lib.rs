//! Byte-level primitives for the gmq marshalling engine.
//!
//! This crate provides [`ByteBuffer`], an append-only byte sequence, [`ReadCursor`],
//! an independent bounds-checked reader over a completed buffer, and the integer
//! codec shared by the binary wire format: VLQ for unsigned values and zig-zag
//! mapping for signed ones.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - Every read is bounds-checked against the underlying slice.
//! - **No format knowledge** - This crate knows nothing about messages, JSON or publishers.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use buffer::{read_vlq, write_vlq, zigzag_decode, zigzag_encode, ByteBuffer};
//!
//! let mut buf = ByteBuffer::new();
//! write_vlq(&mut buf, 300);
//! write_vlq(&mut buf, zigzag_encode(-2));
//!
//! let mut cursor = buf.read_cursor();
//! assert_eq!(read_vlq(&mut cursor).unwrap(), 300);
//! assert_eq!(zigzag_decode(read_vlq(&mut cursor).unwrap()), -2);
//! assert!(cursor.is_exhausted());
//! ```

mod error;
mod reader;
mod vlq;
mod writer;

pub use error::{BufError, BufResult};
pub use reader::ReadCursor;
pub use vlq::{read_vlq, vlq_len, write_vlq, zigzag_decode, zigzag_encode, VLQ_MAX_BYTES};
pub use writer::ByteBuffer;
