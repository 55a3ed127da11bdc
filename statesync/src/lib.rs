//! Publish/subscribe state synchronization over the gmq wire formats.
//!
//! A [`Publisher`] owns a value tree described by a [`schema::Schema`].
//! Mutations made during a tick are tracked per field and flushed by
//! [`Publisher::end_tick`] as one update message naming only what changed.
//! A [`Subscriber`] keeps a replica: it takes one full state sync message,
//! then applies each update in order.
//!
//! # Design Principles
//!
//! - **Arena, not pointers** - Fields are nodes indexed by [`NodeId`]; parents are indices.
//! - **Clean subtrees are skipped** - Dirty marks propagate to the root, so `end_tick` only visits changed branches.
//! - **Element changes replay in order** - Vector and dictionary edits are logged and applied in the same sequence.
//! - **All or nothing** - A subscriber commits an update only after every change in it applied.
//!
//! # Example
//!
//! ```
//! use buffer::ByteBuffer;
//! use schema::{FieldDef, Schema};
//! use statesync::{Publisher, Subscriber, Value};
//! use wire::{Composer, Parser, WireFormat};
//!
//! let schema = Schema::builder("Counter")
//!     .field(FieldDef::signed("value"))
//!     .build()
//!     .unwrap();
//! let mut publisher = Publisher::with_defaults(WireFormat::Gmq, schema.clone());
//! let mut subscriber = Subscriber::new(schema);
//!
//! let mut snapshot = ByteBuffer::new();
//! publisher
//!     .generate_state_sync_message(&mut Composer::gmq(&mut snapshot))
//!     .unwrap();
//! subscriber
//!     .apply_state_sync_message(&mut Parser::gmq(snapshot.read_cursor()))
//!     .unwrap();
//!
//! let value = publisher.node(&["value"]).unwrap();
//! publisher.start_tick(ByteBuffer::new());
//! publisher.set(value, Value::Signed(7)).unwrap();
//! let update = publisher.end_tick().unwrap();
//!
//! subscriber
//!     .apply_message_with_updates(&mut Parser::gmq(update.read_cursor()))
//!     .unwrap();
//! assert_eq!(subscriber.data(), publisher.data());
//! ```

mod dirty;
mod envelope;
mod error;
mod limits;
mod publisher;
mod snapshot;
mod subscriber;
mod tree;
mod types;
mod value;

pub use envelope::{DictionaryAction, ElementAction};
pub use error::{LimitKind, SyncError, SyncResult};
pub use limits::SyncLimits;
pub use publisher::Publisher;
pub use subscriber::Subscriber;
pub use types::NodeId;
pub use value::Value;
