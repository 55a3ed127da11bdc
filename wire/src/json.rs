//! JSON text format.
//!
//! Structural markers are meaningful here: structs become objects, names
//! become keys and the caller's "more follow" flag becomes a comma. Numbers
//! and strings follow RFC 8259 in both directions.

use buffer::{BufError, ByteBuffer, ReadCursor};

use crate::error::{FormatReason, LimitKind, WireError, WireResult};
use crate::limits::Limits;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// JSON composer appending to a borrowed buffer.
#[derive(Debug)]
pub struct JsonComposer<'a> {
    buf: &'a mut ByteBuffer,
}

impl<'a> JsonComposer<'a> {
    #[must_use]
    pub fn new(buf: &'a mut ByteBuffer) -> Self {
        Self { buf }
    }

    pub fn raw(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
    }

    pub fn signed(&mut self, value: i64) {
        self.raw(&value.to_string());
    }

    pub fn unsigned(&mut self, value: u64) {
        self.raw(&value.to_string());
    }

    /// Writes the shortest decimal that parses back to the same `f64`.
    pub fn real(&mut self, value: f64) -> WireResult<()> {
        if !value.is_finite() {
            return Err(WireError::NonFiniteReal);
        }
        self.raw(&value.to_string());
        Ok(())
    }

    pub fn string(&mut self, value: &str) {
        self.buf.push(b'"');
        for &byte in value.as_bytes() {
            match byte {
                b'"' => self.buf.extend_from_slice(b"\\\""),
                b'\\' => self.buf.extend_from_slice(b"\\\\"),
                b'\n' => self.buf.extend_from_slice(b"\\n"),
                b'\r' => self.buf.extend_from_slice(b"\\r"),
                b'\t' => self.buf.extend_from_slice(b"\\t"),
                0x08 => self.buf.extend_from_slice(b"\\b"),
                0x0C => self.buf.extend_from_slice(b"\\f"),
                0x00..=0x1F => {
                    self.buf.extend_from_slice(b"\\u00");
                    self.buf.push(HEX[usize::from(byte >> 4)]);
                    self.buf.push(HEX[usize::from(byte & 0x0F)]);
                }
                _ => self.buf.push(byte),
            }
        }
        self.buf.push(b'"');
    }

    pub fn struct_begin(&mut self) {
        self.buf.push(b'{');
    }

    pub fn struct_end(&mut self) {
        self.buf.push(b'}');
    }

    /// Writes `"name":`.
    pub fn name(&mut self, name: &str) {
        self.string(name);
        self.buf.push(b':');
    }

    pub fn separator(&mut self, more: bool) {
        if more {
            self.buf.push(b',');
        }
    }

    /// Opens the `{"size":N,"data":[` collection form.
    pub fn collection_begin(&mut self, size: usize) {
        self.raw("{\"size\":");
        self.unsigned(size as u64);
        self.raw(",\"data\":[");
    }

    pub fn element_separator(&mut self) {
        self.buf.push(b',');
    }

    pub fn collection_end(&mut self) {
        self.raw("]}");
    }
}

/// A scanned number literal.
struct Number {
    text: String,
    integral: bool,
    position: usize,
}

/// JSON parser over a read cursor.
#[derive(Debug, Clone)]
pub struct JsonParser<'a> {
    cursor: ReadCursor<'a>,
    limits: Limits,
}

impl<'a> JsonParser<'a> {
    #[must_use]
    pub fn new(cursor: ReadCursor<'a>, limits: Limits) -> Self {
        Self { cursor, limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &Limits {
        &self.limits
    }

    #[must_use]
    pub const fn cursor(&self) -> &ReadCursor<'a> {
        &self.cursor
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.cursor.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.bump();
        }
    }

    /// Returns `true` if the next non-whitespace byte is `delimiter`, without consuming it.
    pub fn is_delimiter(&mut self, delimiter: u8) -> bool {
        self.skip_whitespace();
        self.cursor.peek() == Some(delimiter)
    }

    /// Skips whitespace and consumes `byte`, failing on anything else.
    pub fn expect(&mut self, byte: u8, expected: &'static str) -> WireResult<()> {
        self.skip_whitespace();
        let position = self.cursor.position();
        let found = self.cursor.read_u8()?;
        if found != byte {
            return Err(bad_format(
                position,
                FormatReason::UnexpectedByte { expected, found },
            ));
        }
        Ok(())
    }

    pub fn struct_begin(&mut self) -> WireResult<()> {
        self.expect(b'{', "'{'")
    }

    pub fn struct_end(&mut self) -> WireResult<()> {
        self.expect(b'}', "'}'")
    }

    pub fn separator(&mut self, more: bool) -> WireResult<()> {
        if more {
            self.expect(b',', "','")?;
        }
        Ok(())
    }

    /// Reads a quoted key and the following colon.
    pub fn key(&mut self) -> WireResult<String> {
        let key = self.string()?;
        self.expect(b':', "':'")?;
        Ok(key)
    }

    /// Reads a key and checks it is literally `name`.
    pub fn expect_key(&mut self, name: &str) -> WireResult<()> {
        self.skip_whitespace();
        let position = self.cursor.position();
        let found = self.key()?;
        if found != name {
            return Err(bad_format(
                position,
                FormatReason::KeyMismatch {
                    expected: name.to_string(),
                    found,
                },
            ));
        }
        Ok(())
    }

    pub fn unsigned(&mut self) -> WireResult<u64> {
        let number = self.integer()?;
        number
            .text
            .parse()
            .map_err(|_| WireError::ValueOutOfRange { target: "u64" })
    }

    pub fn signed(&mut self) -> WireResult<i64> {
        let number = self.integer()?;
        number
            .text
            .parse()
            .map_err(|_| WireError::ValueOutOfRange { target: "i64" })
    }

    pub fn real(&mut self) -> WireResult<f64> {
        let number = self.number()?;
        let value: f64 = number
            .text
            .parse()
            .map_err(|_| bad_format(number.position, FormatReason::InvalidNumber))?;
        if !value.is_finite() {
            return Err(WireError::ValueOutOfRange { target: "f64" });
        }
        Ok(value)
    }

    pub fn string(&mut self) -> WireResult<String> {
        self.expect(b'"', "'\"'")?;
        let start = self.cursor.position();
        let mut bytes = Vec::new();
        loop {
            let position = self.cursor.position();
            match self.cursor.read_u8()? {
                b'"' => break,
                b'\\' => self.escape(&mut bytes, position)?,
                byte if byte < 0x20 => {
                    return Err(bad_format(position, FormatReason::ControlCharacter));
                }
                byte => bytes.push(byte),
            }
            if bytes.len() > self.limits.max_string_bytes {
                return Err(WireError::LimitsExceeded {
                    kind: LimitKind::StringBytes,
                    limit: self.limits.max_string_bytes,
                    actual: bytes.len(),
                });
            }
        }
        String::from_utf8(bytes).map_err(|_| bad_format(start, FormatReason::InvalidUtf8))
    }

    /// Opens a collection in either accepted shape.
    ///
    /// Returns the declared size for the `{"size":N,"data":[` form and `None`
    /// for a bare array.
    pub fn collection_begin(&mut self) -> WireResult<Option<usize>> {
        if !self.is_delimiter(b'{') {
            self.expect(b'[', "'['")?;
            return Ok(None);
        }
        self.struct_begin()?;
        self.expect_key("size")?;
        let size = usize::try_from(self.unsigned()?).unwrap_or(usize::MAX);
        if size > self.limits.max_collection_len {
            return Err(WireError::LimitsExceeded {
                kind: LimitKind::CollectionLength,
                limit: self.limits.max_collection_len,
                actual: size,
            });
        }
        self.separator(true)?;
        self.expect_key("data")?;
        self.expect(b'[', "'['")?;
        Ok(Some(size))
    }

    /// Decides whether another element follows, given `index` elements already read.
    ///
    /// Consumes the separating comma or the closing bracket.
    pub fn collection_next(&mut self, index: usize) -> WireResult<bool> {
        if index == 0 {
            if self.is_delimiter(b']') {
                self.bump();
                return Ok(false);
            }
            return Ok(true);
        }
        self.skip_whitespace();
        let position = self.cursor.position();
        match self.cursor.read_u8()? {
            b',' => Ok(true),
            b']' => Ok(false),
            found => Err(bad_format(
                position,
                FormatReason::UnexpectedByte {
                    expected: "',' or ']'",
                    found,
                },
            )),
        }
    }

    /// Closes the object form and checks the declared size.
    pub fn collection_end(&mut self, declared: Option<usize>, actual: usize) -> WireResult<()> {
        if let Some(declared) = declared {
            if declared != actual {
                return Err(bad_format(
                    self.cursor.position(),
                    FormatReason::SizeMismatch { declared, actual },
                ));
            }
            self.struct_end()?;
        }
        Ok(())
    }

    fn bump(&mut self) {
        let _ = self.cursor.read_u8();
    }

    fn take(&mut self, text: &mut String) {
        if let Some(byte) = self.cursor.peek() {
            text.push(char::from(byte));
            self.bump();
        }
    }

    fn take_digits(&mut self, text: &mut String, position: usize) -> WireResult<()> {
        match self.cursor.peek() {
            Some(b'0'..=b'9') => {}
            Some(_) => return Err(bad_format(position, FormatReason::InvalidNumber)),
            None => return Err(eof()),
        }
        while matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
            self.take(text);
        }
        Ok(())
    }

    fn number(&mut self) -> WireResult<Number> {
        self.skip_whitespace();
        let position = self.cursor.position();
        let mut text = String::new();
        let mut integral = true;

        if self.cursor.peek() == Some(b'-') {
            self.take(&mut text);
        }
        if self.cursor.peek() == Some(b'0') {
            self.take(&mut text);
        } else {
            self.take_digits(&mut text, position)?;
        }
        if self.cursor.peek() == Some(b'.') {
            integral = false;
            self.take(&mut text);
            self.take_digits(&mut text, position)?;
        }
        if matches!(self.cursor.peek(), Some(b'e' | b'E')) {
            integral = false;
            self.take(&mut text);
            if matches!(self.cursor.peek(), Some(b'+' | b'-')) {
                self.take(&mut text);
            }
            self.take_digits(&mut text, position)?;
        }
        Ok(Number {
            text,
            integral,
            position,
        })
    }

    fn integer(&mut self) -> WireResult<Number> {
        let number = self.number()?;
        if !number.integral {
            return Err(bad_format(number.position, FormatReason::InvalidNumber));
        }
        Ok(number)
    }

    fn escape(&mut self, out: &mut Vec<u8>, position: usize) -> WireResult<()> {
        let decoded = match self.cursor.read_u8()? {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => self.unicode_escape(position)?,
            _ => return Err(bad_format(position, FormatReason::InvalidEscape)),
        };
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(decoded.encode_utf8(&mut utf8).as_bytes());
        Ok(())
    }

    fn unicode_escape(&mut self, position: usize) -> WireResult<char> {
        let high = self.hex4(position)?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if self.cursor.read_u8()? != b'\\' || self.cursor.read_u8()? != b'u' {
                return Err(bad_format(position, FormatReason::InvalidEscape));
            }
            let low = self.hex4(position)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(bad_format(position, FormatReason::InvalidEscape));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| bad_format(position, FormatReason::InvalidEscape))
    }

    fn hex4(&mut self, position: usize) -> WireResult<u32> {
        let mut value = 0;
        for _ in 0..4 {
            let digit = char::from(self.cursor.read_u8()?)
                .to_digit(16)
                .ok_or_else(|| bad_format(position, FormatReason::InvalidEscape))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }
}

const fn bad_format(position: usize, reason: FormatReason) -> WireError {
    WireError::BadFormat { position, reason }
}

const fn eof() -> WireError {
    WireError::Truncated(BufError::UnexpectedEof {
        requested: 1,
        available: 0,
    })
}
