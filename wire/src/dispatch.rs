//! Message-id dispatch.
//!
//! A message on the wire is an id followed by a body. In GMQ that is a VLQ id
//! and the positional body; in JSON it is `{"msgid":<id>,"msgbody":<body>}`.
//! Both shapes fall out of the same composer/parser calls because GMQ struct
//! markers and names write nothing.

use tracing::{debug, warn};

use crate::composer::Composer;
use crate::error::{DispatchError, WireError, WireResult};
use crate::parser::Parser;
use crate::wrapper::ComposeMessage;

const MSG_ID_KEY: &str = "msgid";
const MSG_BODY_KEY: &str = "msgbody";

/// Boxed handler body. It reads the message body from the parser.
pub type HandlerFn<'h> = Box<dyn FnMut(&mut Parser<'_>) -> WireResult<()> + 'h>;

/// Which ids a handler accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerTarget {
    /// Exactly this message id.
    Id(u64),
    /// Any id no specific handler claims.
    Fallback,
}

/// A handler paired with the ids it accepts.
pub struct MessageHandler<'h> {
    target: HandlerTarget,
    handler: HandlerFn<'h>,
}

impl<'h> MessageHandler<'h> {
    /// Handles messages with id `msg_id`.
    pub fn new(msg_id: u64, handler: impl FnMut(&mut Parser<'_>) -> WireResult<()> + 'h) -> Self {
        Self {
            target: HandlerTarget::Id(msg_id),
            handler: Box::new(handler),
        }
    }

    /// Handles every id without a specific handler.
    pub fn fallback(handler: impl FnMut(&mut Parser<'_>) -> WireResult<()> + 'h) -> Self {
        Self {
            target: HandlerTarget::Fallback,
            handler: Box::new(handler),
        }
    }

    #[must_use]
    pub const fn target(&self) -> HandlerTarget {
        self.target
    }
}

/// Ordered handler list with an optional fallback.
///
/// The set of handlers is fixed at [`HandlerTable::build`]; the handlers
/// themselves may mutate whatever state they captured.
pub struct HandlerTable<'h> {
    handlers: Vec<(u64, HandlerFn<'h>)>,
    fallback: Option<HandlerFn<'h>>,
}

impl<'h> HandlerTable<'h> {
    /// Builds a table. At most one fallback is allowed.
    pub fn build(
        handlers: impl IntoIterator<Item = MessageHandler<'h>>,
    ) -> Result<Self, DispatchError> {
        let mut table = Self {
            handlers: Vec::new(),
            fallback: None,
        };
        for MessageHandler { target, handler } in handlers {
            match target {
                HandlerTarget::Id(msg_id) => table.handlers.push((msg_id, handler)),
                HandlerTarget::Fallback => {
                    if table.fallback.is_some() {
                        return Err(DispatchError::DuplicateFallbackHandler);
                    }
                    table.fallback = Some(handler);
                }
            }
        }
        Ok(table)
    }

    /// Number of id-specific handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.fallback.is_none()
    }

    #[must_use]
    pub const fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Runs the first handler registered for `msg_id`, else the fallback.
    ///
    /// Returns `Ok(false)` if nothing ran.
    pub fn handle(&mut self, parser: &mut Parser<'_>, msg_id: u64) -> WireResult<bool> {
        if let Some((_, handler)) = self.handlers.iter_mut().find(|(id, _)| *id == msg_id) {
            debug!(msg_id, "dispatching message");
            handler(parser)?;
            return Ok(true);
        }
        if let Some(handler) = self.fallback.as_mut() {
            debug!(msg_id, "dispatching message to fallback handler");
            handler(parser)?;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Reads a message envelope and dispatches its body.
///
/// Returns the message id. An id with no handler and no fallback is rejected
/// with [`WireError::UnmatchedMessageId`]; the body is left unread.
pub fn handle_message(parser: &mut Parser<'_>, table: &mut HandlerTable<'_>) -> WireResult<u64> {
    parser.struct_begin()?;
    parser.name(MSG_ID_KEY)?;
    let msg_id = parser.parse_unsigned()?;
    parser.separator(true)?;
    parser.name(MSG_BODY_KEY)?;
    if !table.handle(parser, msg_id)? {
        warn!(msg_id, format = %parser.format(), "no handler for message");
        return Err(WireError::UnmatchedMessageId { msg_id });
    }
    parser.struct_end()?;
    Ok(msg_id)
}

/// Writes a message envelope around `body`.
pub fn compose_message(
    composer: &mut Composer<'_>,
    msg_id: u64,
    body: &dyn ComposeMessage,
) -> WireResult<()> {
    composer.struct_begin();
    composer.unsigned_field(MSG_ID_KEY, msg_id, true);
    composer.name(MSG_BODY_KEY);
    body.compose(composer)?;
    composer.struct_end();
    Ok(())
}
