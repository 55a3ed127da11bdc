//! Format-polymorphic parser.

use buffer::ReadCursor;

use crate::error::{LimitKind, WireError, WireResult};
use crate::format::WireFormat;
use crate::gmq::GmqParser;
use crate::json::JsonParser;
use crate::limits::Limits;
use crate::wrapper::{ParseCollection, ParseMessage, Parseable, Primitive};

/// Reads values from a [`ReadCursor`] in one of the two wire formats.
///
/// The call sequence mirrors [`crate::Composer`]: message code reads fields
/// in declaration order and the variant decides how each is framed.
#[derive(Debug, Clone)]
pub enum Parser<'a> {
    Gmq(GmqParser<'a>),
    Json(JsonParser<'a>),
}

impl<'a> Parser<'a> {
    /// Creates a parser for `format` with default limits.
    #[must_use]
    pub fn new(format: WireFormat, cursor: ReadCursor<'a>) -> Self {
        Self::with_limits(format, cursor, Limits::default())
    }

    #[must_use]
    pub fn with_limits(format: WireFormat, cursor: ReadCursor<'a>, limits: Limits) -> Self {
        match format {
            WireFormat::Gmq => Self::Gmq(GmqParser::new(cursor, limits)),
            WireFormat::Json => Self::Json(JsonParser::new(cursor, limits)),
        }
    }

    #[must_use]
    pub fn gmq(cursor: ReadCursor<'a>) -> Self {
        Self::new(WireFormat::Gmq, cursor)
    }

    #[must_use]
    pub fn json(cursor: ReadCursor<'a>) -> Self {
        Self::new(WireFormat::Json, cursor)
    }

    #[must_use]
    pub const fn format(&self) -> WireFormat {
        match self {
            Self::Gmq(_) => WireFormat::Gmq,
            Self::Json(_) => WireFormat::Json,
        }
    }

    #[must_use]
    pub const fn limits(&self) -> &Limits {
        match self {
            Self::Gmq(p) => p.limits(),
            Self::Json(p) => p.limits(),
        }
    }

    /// Current byte offset in the input.
    #[must_use]
    pub const fn position(&self) -> usize {
        match self {
            Self::Gmq(p) => p.cursor().position(),
            Self::Json(p) => p.cursor().position(),
        }
    }

    /// Returns `true` once every input byte has been consumed.
    ///
    /// JSON input may still hold trailing whitespace when this returns `false`.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        match self {
            Self::Gmq(p) => p.cursor().is_exhausted(),
            Self::Json(p) => p.cursor().is_exhausted(),
        }
    }

    pub fn parse_signed(&mut self) -> WireResult<i64> {
        match self {
            Self::Gmq(p) => p.signed(),
            Self::Json(p) => p.signed(),
        }
    }

    pub fn parse_unsigned(&mut self) -> WireResult<u64> {
        match self {
            Self::Gmq(p) => p.unsigned(),
            Self::Json(p) => p.unsigned(),
        }
    }

    pub fn parse_real(&mut self) -> WireResult<f64> {
        match self {
            Self::Gmq(p) => p.real(),
            Self::Json(p) => p.real(),
        }
    }

    pub fn parse_string(&mut self) -> WireResult<String> {
        match self {
            Self::Gmq(p) => p.string(),
            Self::Json(p) => p.string(),
        }
    }

    /// Reads any [`Primitive`] through the matching typed operation.
    pub fn parse_primitive<T: Primitive>(&mut self) -> WireResult<T> {
        T::parse_from(self)
    }

    /// Reads into a wrapped collection or nested message.
    pub fn parse(&mut self, value: Parseable<'_>) -> WireResult<()> {
        match value {
            Parseable::Collection(collection) => self.parse_collection(collection),
            Parseable::Message(message) => self.parse_struct(message),
        }
    }

    /// Reads a collection, handing each element to `collection` in order.
    ///
    /// GMQ stops when the declared count is exhausted; JSON stops at the
    /// closing bracket and, for the object form, checks the declared size.
    pub fn parse_collection(&mut self, collection: &mut dyn ParseCollection) -> WireResult<()> {
        let declared = match self {
            Self::Gmq(p) => Some(p.collection_begin()?),
            Self::Json(p) => p.collection_begin()?,
        };
        if let Some(size) = declared {
            collection.size_hint(size);
        }

        let limit = self.limits().max_collection_len;
        let mut ordinal = 0;
        while self.collection_next(ordinal, declared)? {
            if ordinal >= limit {
                return Err(WireError::LimitsExceeded {
                    kind: LimitKind::CollectionLength,
                    limit,
                    actual: ordinal + 1,
                });
            }
            collection.parse_element(self, ordinal)?;
            ordinal += 1;
        }

        match self {
            Self::Gmq(_) => Ok(()),
            Self::Json(p) => p.collection_end(declared, ordinal),
        }
    }

    /// Re-enters a nested message's own parse routine.
    pub fn parse_struct(&mut self, message: &mut dyn ParseMessage) -> WireResult<()> {
        message.parse(self)
    }

    /// Reads one dictionary entry written by [`crate::Composer::compose_entry`].
    pub fn parse_entry<K, V>(
        &mut self,
        key: impl FnOnce(&mut Self) -> WireResult<K>,
        value: impl FnOnce(&mut Self) -> WireResult<V>,
    ) -> WireResult<(K, V)> {
        self.struct_begin()?;
        self.name("key")?;
        let key = key(self)?;
        self.separator(true)?;
        self.name("value")?;
        let value = value(self)?;
        self.separator(false)?;
        self.struct_end()?;
        Ok((key, value))
    }

    pub fn struct_begin(&mut self) -> WireResult<()> {
        match self {
            Self::Gmq(_) => Ok(()),
            Self::Json(p) => p.struct_begin(),
        }
    }

    pub fn struct_end(&mut self) -> WireResult<()> {
        match self {
            Self::Gmq(_) => Ok(()),
            Self::Json(p) => p.struct_end(),
        }
    }

    /// Consumes the name tag of the next value and checks it matches `expected`.
    pub fn name(&mut self, expected: &str) -> WireResult<()> {
        match self {
            Self::Gmq(_) => Ok(()),
            Self::Json(p) => p.expect_key(expected),
        }
    }

    /// Consumes a field separator when `more` fields follow.
    pub fn separator(&mut self, more: bool) -> WireResult<()> {
        match self {
            Self::Gmq(_) => Ok(()),
            Self::Json(p) => p.separator(more),
        }
    }

    pub fn signed_field(&mut self, name: &str, more: bool) -> WireResult<i64> {
        self.name(name)?;
        let value = self.parse_signed()?;
        self.separator(more)?;
        Ok(value)
    }

    pub fn unsigned_field(&mut self, name: &str, more: bool) -> WireResult<u64> {
        self.name(name)?;
        let value = self.parse_unsigned()?;
        self.separator(more)?;
        Ok(value)
    }

    pub fn real_field(&mut self, name: &str, more: bool) -> WireResult<f64> {
        self.name(name)?;
        let value = self.parse_real()?;
        self.separator(more)?;
        Ok(value)
    }

    pub fn string_field(&mut self, name: &str, more: bool) -> WireResult<String> {
        self.name(name)?;
        let value = self.parse_string()?;
        self.separator(more)?;
        Ok(value)
    }

    pub fn parseable_field(
        &mut self,
        name: &str,
        value: Parseable<'_>,
        more: bool,
    ) -> WireResult<()> {
        self.name(name)?;
        self.parse(value)?;
        self.separator(more)
    }

    fn collection_next(&mut self, ordinal: usize, declared: Option<usize>) -> WireResult<bool> {
        match self {
            Self::Gmq(_) => Ok(declared.is_some_and(|size| ordinal < size)),
            Self::Json(p) => p.collection_next(ordinal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatReason;
    use crate::wrapper::PrimitivesMut;

    fn json(text: &str) -> Parser<'_> {
        Parser::json(ReadCursor::new(text.as_bytes()))
    }

    #[test]
    fn json_collection_accepts_both_shapes() {
        for text in ["[1, 2, 3]", r#"{"size":3,"data":[1,2,3]}"#] {
            let mut values: Vec<i32> = Vec::new();
            json(text)
                .parse(Parseable::Collection(&mut PrimitivesMut(&mut values)))
                .unwrap();
            assert_eq!(values, vec![1, 2, 3], "input {text}");
        }
    }

    #[test]
    fn json_empty_bare_array() {
        let mut values: Vec<u64> = Vec::new();
        let mut parser = json(" [ ] ");
        parser
            .parse(Parseable::Collection(&mut PrimitivesMut(&mut values)))
            .unwrap();
        assert!(values.is_empty());
    }

    #[test]
    fn json_collection_bad_separator() {
        let mut values: Vec<i64> = Vec::new();
        let err = json("[1; 2]")
            .parse(Parseable::Collection(&mut PrimitivesMut(&mut values)))
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::BadFormat {
                position: 2,
                reason: FormatReason::UnexpectedByte { found: b';', .. }
            }
        ));
    }

    #[test]
    fn bare_array_length_limited() {
        let text = format!("[{}0]", "0,".repeat(300));
        let mut parser = Parser::with_limits(
            WireFormat::Json,
            ReadCursor::new(text.as_bytes()),
            Limits::for_testing(),
        );
        let mut values: Vec<u8> = Vec::new();
        let err = parser
            .parse(Parseable::Collection(&mut PrimitivesMut(&mut values)))
            .unwrap_err();
        assert!(matches!(
            err,
            WireError::LimitsExceeded {
                kind: LimitKind::CollectionLength,
                limit: 256,
                actual: 257
            }
        ));
    }

    #[test]
    fn json_field_name_checked() {
        let mut parser = json(r#"{"a":1,"b":2}"#);
        parser.struct_begin().unwrap();
        assert_eq!(parser.signed_field("a", true).unwrap(), 1);
        let err = parser.signed_field("c", false).unwrap_err();
        assert!(matches!(
            err,
            WireError::BadFormat {
                reason: FormatReason::KeyMismatch { .. },
                ..
            }
        ));
    }

    #[test]
    fn gmq_names_are_ignored() {
        let bytes = [0x03, 0x05];
        let mut parser = Parser::gmq(ReadCursor::new(&bytes));
        parser.struct_begin().unwrap();
        assert_eq!(parser.signed_field("anything", true).unwrap(), -2);
        assert_eq!(parser.unsigned_field("else", false).unwrap(), 5);
        parser.struct_end().unwrap();
        assert!(parser.is_exhausted());
    }
}
