//! Format-polymorphic composer.

use buffer::ByteBuffer;

use crate::error::WireResult;
use crate::format::WireFormat;
use crate::gmq::GmqComposer;
use crate::json::JsonComposer;
use crate::wrapper::{Composable, ComposeCollection, ComposeMessage, Primitive};

/// Writes values into a [`ByteBuffer`] in one of the two wire formats.
///
/// Message code calls the same sequence of operations regardless of format;
/// each variant decides what bytes, if any, an operation produces.
#[derive(Debug)]
pub enum Composer<'a> {
    Gmq(GmqComposer<'a>),
    Json(JsonComposer<'a>),
}

impl<'a> Composer<'a> {
    /// Creates a composer for `format` appending to `buf`.
    #[must_use]
    pub fn new(format: WireFormat, buf: &'a mut ByteBuffer) -> Self {
        match format {
            WireFormat::Gmq => Self::Gmq(GmqComposer::new(buf)),
            WireFormat::Json => Self::Json(JsonComposer::new(buf)),
        }
    }

    #[must_use]
    pub fn gmq(buf: &'a mut ByteBuffer) -> Self {
        Self::new(WireFormat::Gmq, buf)
    }

    #[must_use]
    pub fn json(buf: &'a mut ByteBuffer) -> Self {
        Self::new(WireFormat::Json, buf)
    }

    #[must_use]
    pub const fn format(&self) -> WireFormat {
        match self {
            Self::Gmq(_) => WireFormat::Gmq,
            Self::Json(_) => WireFormat::Json,
        }
    }

    pub fn compose_signed(&mut self, value: i64) {
        match self {
            Self::Gmq(c) => c.signed(value),
            Self::Json(c) => c.signed(value),
        }
    }

    pub fn compose_unsigned(&mut self, value: u64) {
        match self {
            Self::Gmq(c) => c.unsigned(value),
            Self::Json(c) => c.unsigned(value),
        }
    }

    /// Writes a real. Fails in JSON for NaN and infinities.
    pub fn compose_real(&mut self, value: f64) -> WireResult<()> {
        match self {
            Self::Gmq(c) => {
                c.real(value);
                Ok(())
            }
            Self::Json(c) => c.real(value),
        }
    }

    pub fn compose_string(&mut self, value: &str) {
        match self {
            Self::Gmq(c) => c.string(value),
            Self::Json(c) => c.string(value),
        }
    }

    /// Writes any [`Primitive`] through the matching typed operation.
    pub fn compose_primitive<T: Primitive>(&mut self, value: &T) -> WireResult<()> {
        value.compose_into(self)
    }

    /// Writes a wrapped collection or nested message.
    pub fn compose(&mut self, value: Composable<'_>) -> WireResult<()> {
        match value {
            Composable::Collection(collection) => self.compose_collection(collection),
            Composable::Message(message) => self.compose_struct(message),
        }
    }

    /// Writes the element count (or opening marker), then each element in order.
    pub fn compose_collection(&mut self, collection: &dyn ComposeCollection) -> WireResult<()> {
        let size = collection.size();
        match self {
            Self::Gmq(c) => c.collection_begin(size),
            Self::Json(c) => c.collection_begin(size),
        }
        for ordinal in 0..size {
            if ordinal > 0 {
                if let Self::Json(c) = self {
                    c.element_separator();
                }
            }
            collection.compose_element(self, ordinal)?;
        }
        if let Self::Json(c) = self {
            c.collection_end();
        }
        Ok(())
    }

    /// Writes one dictionary entry: the key, then the value.
    ///
    /// JSON frames the pair as `{"key":K,"value":V}`; GMQ writes the two
    /// values back to back.
    pub fn compose_entry(
        &mut self,
        key: impl FnOnce(&mut Self) -> WireResult<()>,
        value: impl FnOnce(&mut Self) -> WireResult<()>,
    ) -> WireResult<()> {
        self.struct_begin();
        self.name("key");
        key(self)?;
        self.separator(true);
        self.name("value");
        value(self)?;
        self.separator(false);
        self.struct_end();
        Ok(())
    }

    /// Re-enters a nested message's own compose routine.
    pub fn compose_struct(&mut self, message: &dyn ComposeMessage) -> WireResult<()> {
        message.compose(self)
    }

    pub fn struct_begin(&mut self) {
        if let Self::Json(c) = self {
            c.struct_begin();
        }
    }

    pub fn struct_end(&mut self) {
        if let Self::Json(c) = self {
            c.struct_end();
        }
    }

    /// Tags the next value with a field name (JSON key; nothing in GMQ).
    pub fn name(&mut self, name: &str) {
        if let Self::Json(c) = self {
            c.name(name);
        }
    }

    /// Writes a field separator when `more` fields follow.
    pub fn separator(&mut self, more: bool) {
        if let Self::Json(c) = self {
            c.separator(more);
        }
    }

    pub fn signed_field(&mut self, name: &str, value: i64, more: bool) {
        self.name(name);
        self.compose_signed(value);
        self.separator(more);
    }

    pub fn unsigned_field(&mut self, name: &str, value: u64, more: bool) {
        self.name(name);
        self.compose_unsigned(value);
        self.separator(more);
    }

    pub fn real_field(&mut self, name: &str, value: f64, more: bool) -> WireResult<()> {
        self.name(name);
        self.compose_real(value)?;
        self.separator(more);
        Ok(())
    }

    pub fn string_field(&mut self, name: &str, value: &str, more: bool) {
        self.name(name);
        self.compose_string(value);
        self.separator(more);
    }

    pub fn composable_field(
        &mut self,
        name: &str,
        value: Composable<'_>,
        more: bool,
    ) -> WireResult<()> {
        self.name(name);
        self.compose(value)?;
        self.separator(more);
        Ok(())
    }
}
