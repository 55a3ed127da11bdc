//! Reference types for the gmq demos and tests.
//!
//! [`messages`] holds plain messages written the way generated code looks:
//! one `compose`/`parse` pair per struct calling the named field helpers in
//! declaration order. [`publishable`] holds the `StructSix` state tree used
//! to exercise publish/subscribe.

pub mod messages;
pub mod publishable;

pub use messages::{
    compose_message_dictionary, compose_message_one, compose_point, compose_point3d,
    MessageDictionary, MessageOne, Point, Point3D, MSG_MESSAGE_DICTIONARY, MSG_MESSAGE_ONE,
    MSG_POINT, MSG_POINT3D,
};
pub use publishable::{basic_types_def, struct_six_schema, struct_six_value};
