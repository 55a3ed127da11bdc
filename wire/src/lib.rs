//! Composers, parsers and message dispatch for the gmq marshalling engine.
//!
//! Message code is written once against [`Composer`] and [`Parser`] and works
//! for both wire formats: GMQ, a positional binary form built on VLQ integers,
//! and JSON. Collections and nested messages go through the value wrapper
//! traits so the format owns framing while the caller owns traversal.
//!
//! # Design Principles
//!
//! - **Closed format set** - [`Composer`] and [`Parser`] are enums over the two formats.
//! - **Declaration order is the contract** - Fields are read in the order they were written.
//! - **Bounded decoding** - Counts and string lengths are checked against [`Limits`] before allocation.
//! - **No recovery** - A failed parse leaves the cursor unspecified; drop the message.
//!
//! See `WIRE_FORMAT.md` for the byte-level layout.
//!
//! # Example
//!
//! ```
//! use buffer::ByteBuffer;
//! use wire::{Composable, Composer, Parseable, Parser, Primitives, PrimitivesMut, WireFormat};
//!
//! let values = vec![3i64, -1, 4];
//! for format in WireFormat::ALL {
//!     let mut buf = ByteBuffer::new();
//!     Composer::new(format, &mut buf)
//!         .compose(Composable::Collection(&Primitives(&values)))
//!         .unwrap();
//!
//!     let mut decoded: Vec<i64> = Vec::new();
//!     Parser::new(format, buf.read_cursor())
//!         .parse(Parseable::Collection(&mut PrimitivesMut(&mut decoded)))
//!         .unwrap();
//!     assert_eq!(decoded, values);
//! }
//! ```

mod composer;
mod dispatch;
mod error;
mod format;
mod gmq;
mod json;
mod limits;
mod parser;
mod wrapper;

pub use composer::Composer;
pub use dispatch::{
    compose_message, handle_message, HandlerFn, HandlerTable, HandlerTarget, MessageHandler,
};
pub use error::{DispatchError, FormatReason, LimitKind, WireError, WireResult};
pub use format::WireFormat;
pub use gmq::{GmqComposer, GmqParser};
pub use json::{JsonComposer, JsonParser};
pub use limits::Limits;
pub use parser::Parser;
pub use wrapper::{
    Composable, ComposeCollection, ComposeMessage, Map, MapMut, MessageMap, MessageMapMut,
    Messages, MessagesMut, ParseCollection, ParseMessage, Parseable, Primitive, Primitives,
    PrimitivesMut,
};
