//! Full-value encoding of publishable trees.
//!
//! Structs go through the message wrapper; vectors and dictionaries go
//! through the collection wrapper, so a state sync message is shaped exactly like a generated
//! message of the same layout.

use schema::{FieldType, StructDef};
use wire::{
    ComposeCollection, ComposeMessage, Composer, ParseCollection, ParseMessage, Parser, WireError,
    WireResult,
};

use crate::value::Value;

const MAX_RESERVE: usize = 1024;

/// Borrowed struct value paired with its definition.
pub(crate) struct StructView<'a> {
    pub def: &'a StructDef,
    pub fields: &'a [Value],
}

impl ComposeMessage for StructView<'_> {
    fn compose(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.struct_begin();
        let count = self.def.fields.len();
        for (index, (field, value)) in self.def.fields.iter().zip(self.fields).enumerate() {
            composer.name(&field.name);
            compose_value(composer, &field.ty, value)?;
            composer.separator(index + 1 < count);
        }
        composer.struct_end();
        Ok(())
    }
}

struct VectorView<'a> {
    element: &'a FieldType,
    items: &'a [Value],
}

impl ComposeCollection for VectorView<'_> {
    fn size(&self) -> usize {
        self.items.len()
    }

    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()> {
        compose_value(composer, self.element, &self.items[ordinal])
    }
}

struct DictionaryView<'a> {
    key: &'a FieldType,
    value: &'a FieldType,
    entries: &'a [(Value, Value)],
}

impl ComposeCollection for DictionaryView<'_> {
    fn size(&self) -> usize {
        self.entries.len()
    }

    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()> {
        let (key, value) = &self.entries[ordinal];
        composer.compose_entry(
            |c| compose_value(c, self.key, key),
            |c| compose_value(c, self.value, value),
        )
    }
}

/// Parses a struct of a known definition into field values.
pub(crate) struct StructSink<'a> {
    pub def: &'a StructDef,
    pub fields: Vec<Value>,
}

impl<'a> StructSink<'a> {
    pub fn new(def: &'a StructDef) -> Self {
        Self {
            def,
            fields: Vec::with_capacity(def.fields.len()),
        }
    }
}

impl ParseMessage for StructSink<'_> {
    fn parse(&mut self, parser: &mut Parser<'_>) -> WireResult<()> {
        parser.struct_begin()?;
        self.fields.clear();
        let count = self.def.fields.len();
        for (index, field) in self.def.fields.iter().enumerate() {
            parser.name(&field.name)?;
            self.fields.push(parse_value(parser, &field.ty)?);
            parser.separator(index + 1 < count)?;
        }
        parser.struct_end()
    }
}

struct VectorSink<'a> {
    element: &'a FieldType,
    items: Vec<Value>,
}

impl ParseCollection for VectorSink<'_> {
    fn size_hint(&mut self, size: usize) {
        self.items.reserve(size.min(MAX_RESERVE));
    }

    fn parse_element(&mut self, parser: &mut Parser<'_>, _ordinal: usize) -> WireResult<()> {
        self.items.push(parse_value(parser, self.element)?);
        Ok(())
    }
}

struct DictionarySink<'a> {
    key: &'a FieldType,
    value: &'a FieldType,
    entries: Vec<(Value, Value)>,
}

impl ParseCollection for DictionarySink<'_> {
    fn size_hint(&mut self, size: usize) {
        self.entries.reserve(size.min(MAX_RESERVE));
    }

    fn parse_element(&mut self, parser: &mut Parser<'_>, ordinal: usize) -> WireResult<()> {
        let entry = parser.parse_entry(
            |p| parse_value(p, self.key),
            |p| parse_value(p, self.value),
        )?;
        if self.entries.iter().any(|(key, _)| *key == entry.0) {
            return Err(WireError::DuplicateKey { ordinal });
        }
        self.entries.push(entry);
        Ok(())
    }
}

/// Writes `value` as a `ty`.
///
/// A value that does not fit `ty` is reported as out of range rather than
/// written in a shape the reader would misparse.
pub(crate) fn compose_value(
    composer: &mut Composer<'_>,
    ty: &FieldType,
    value: &Value,
) -> WireResult<()> {
    match (ty, value) {
        (FieldType::Signed, Value::Signed(v)) => composer.compose_signed(*v),
        (FieldType::Unsigned, Value::Unsigned(v)) => composer.compose_unsigned(*v),
        (FieldType::Real, Value::Real(v)) => composer.compose_real(*v)?,
        (FieldType::String, Value::String(v)) => composer.compose_string(v),
        (FieldType::Struct(def), Value::Struct(fields)) if fields.len() == def.fields.len() => {
            composer.compose_struct(&StructView { def, fields })?;
        }
        (FieldType::Vector(element), Value::Vector(items)) => {
            composer.compose_collection(&VectorView { element, items })?;
        }
        (FieldType::Dictionary { key, value }, Value::Dictionary(entries)) => {
            composer.compose_collection(&DictionaryView {
                key,
                value,
                entries,
            })?;
        }
        _ => {
            return Err(WireError::ValueOutOfRange {
                target: ty.kind_name(),
            })
        }
    }
    Ok(())
}

/// Reads a `ty`.
pub(crate) fn parse_value(parser: &mut Parser<'_>, ty: &FieldType) -> WireResult<Value> {
    Ok(match ty {
        FieldType::Signed => Value::Signed(parser.parse_signed()?),
        FieldType::Unsigned => Value::Unsigned(parser.parse_unsigned()?),
        FieldType::Real => Value::Real(parser.parse_real()?),
        FieldType::String => Value::String(parser.parse_string()?),
        FieldType::Struct(def) => {
            let mut sink = StructSink::new(def);
            parser.parse_struct(&mut sink)?;
            Value::Struct(sink.fields)
        }
        FieldType::Vector(element) => {
            let mut sink = VectorSink {
                element,
                items: Vec::new(),
            };
            parser.parse_collection(&mut sink)?;
            Value::Vector(sink.items)
        }
        FieldType::Dictionary { key, value } => {
            let mut sink = DictionarySink {
                key,
                value,
                entries: Vec::new(),
            };
            parser.parse_collection(&mut sink)?;
            Value::Dictionary(sink.entries)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use buffer::ByteBuffer;
    use schema::FieldDef;
    use wire::WireFormat;

    fn point_def() -> StructDef {
        StructDef::new("Point")
            .field(FieldDef::signed("x"))
            .field(FieldDef::signed("y"))
    }

    fn sample_type() -> FieldType {
        FieldType::Struct(
            StructDef::new("Sample")
                .field(FieldDef::string("label"))
                .field(FieldDef::vector("points", FieldType::Struct(point_def())))
                .field(FieldDef::vector("weights", FieldType::Real))
                .field(FieldDef::dictionary(
                    "tags",
                    FieldType::String,
                    FieldType::String,
                )),
        )
    }

    fn sample_value() -> Value {
        Value::Struct(vec![
            Value::from("hello"),
            Value::Vector(vec![
                Value::Struct(vec![1i64.into(), (-2i64).into()]),
                Value::Struct(vec![3i64.into(), 4i64.into()]),
            ]),
            Value::Vector(vec![0.5.into()]),
            Value::Dictionary(vec![
                ("zone".into(), "north".into()),
                ("owner".into(), String::new().into()),
            ]),
        ])
    }

    #[test]
    fn value_roundtrip_both_formats() {
        for format in WireFormat::ALL {
            let mut buf = ByteBuffer::new();
            compose_value(&mut Composer::new(format, &mut buf), &sample_type(), &sample_value())
                .unwrap();
            let mut parser = Parser::new(format, buf.read_cursor());
            let decoded = parse_value(&mut parser, &sample_type()).unwrap();
            assert_eq!(decoded, sample_value(), "format {format}");
            assert!(parser.is_exhausted());
        }
    }

    #[test]
    fn json_layout_matches_message_layout() {
        let mut buf = ByteBuffer::new();
        compose_value(&mut Composer::json(&mut buf), &sample_type(), &sample_value()).unwrap();
        assert_eq!(
            std::str::from_utf8(buf.as_bytes()).unwrap(),
            r#"{"label":"hello","points":{"size":2,"data":[{"x":1,"y":-2},{"x":3,"y":4}]},"weights":{"size":1,"data":[0.5]},"tags":{"size":2,"data":[{"key":"zone","value":"north"},{"key":"owner","value":""}]}}"#
        );
    }

    #[test]
    fn repeated_dictionary_key_rejected() {
        let ty = FieldType::dictionary(FieldType::Unsigned, FieldType::Signed);
        // count 2, then (1 -> 0) twice
        let bytes = [2u8, 1, 0, 1, 0];
        let err = parse_value(&mut Parser::gmq(buffer::ReadCursor::new(&bytes)), &ty).unwrap_err();
        assert_eq!(err, WireError::DuplicateKey { ordinal: 1 });
    }

    #[test]
    fn mismatched_value_rejected() {
        let mut buf = ByteBuffer::new();
        let err = compose_value(
            &mut Composer::gmq(&mut buf),
            &FieldType::Signed,
            &Value::Unsigned(1),
        )
        .unwrap_err();
        assert_eq!(err, WireError::ValueOutOfRange { target: "signed" });
    }
}
