use buffer::ByteBuffer;
use proptest::prelude::*;
use wire::{Composer, Parser, WireFormat};

#[derive(Clone, Debug, PartialEq)]
enum Field {
    Signed(i64),
    Unsigned(u64),
    Real(f64),
    Text(String),
}

fn field_strategy() -> impl Strategy<Value = Field> {
    prop_oneof![
        any::<i64>().prop_map(Field::Signed),
        any::<u64>().prop_map(Field::Unsigned),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(Field::Real),
        any::<String>().prop_map(Field::Text),
    ]
}

fn compose(format: WireFormat, fields: &[Field]) -> ByteBuffer {
    let mut buf = ByteBuffer::new();
    let mut composer = Composer::new(format, &mut buf);
    composer.struct_begin();
    for (index, field) in fields.iter().enumerate() {
        let name = format!("f{index}");
        let more = index + 1 < fields.len();
        match field {
            Field::Signed(v) => composer.signed_field(&name, *v, more),
            Field::Unsigned(v) => composer.unsigned_field(&name, *v, more),
            Field::Real(v) => composer.real_field(&name, *v, more).unwrap(),
            Field::Text(v) => composer.string_field(&name, v, more),
        }
    }
    composer.struct_end();
    buf
}

fn parse(format: WireFormat, buf: &ByteBuffer, shape: &[Field]) -> Vec<Field> {
    let mut parser = Parser::new(format, buf.read_cursor());
    parser.struct_begin().unwrap();
    let mut out = Vec::new();
    for (index, field) in shape.iter().enumerate() {
        let name = format!("f{index}");
        let more = index + 1 < shape.len();
        out.push(match field {
            Field::Signed(_) => Field::Signed(parser.signed_field(&name, more).unwrap()),
            Field::Unsigned(_) => Field::Unsigned(parser.unsigned_field(&name, more).unwrap()),
            Field::Real(_) => Field::Real(parser.real_field(&name, more).unwrap()),
            Field::Text(_) => Field::Text(parser.string_field(&name, more).unwrap()),
        });
    }
    parser.struct_end().unwrap();
    assert!(parser.is_exhausted());
    out
}

proptest! {
    #[test]
    fn prop_fields_roundtrip(fields in prop::collection::vec(field_strategy(), 0..16)) {
        for format in WireFormat::ALL {
            let buf = compose(format, &fields);
            prop_assert_eq!(parse(format, &buf, &fields), fields.clone());
        }
    }

    #[test]
    fn prop_json_output_is_valid_json(fields in prop::collection::vec(field_strategy(), 0..16)) {
        let buf = compose(WireFormat::Json, &fields);
        let value: serde_json::Value = serde_json::from_slice(buf.as_bytes()).unwrap();
        let object = value.as_object().unwrap();
        prop_assert_eq!(object.len(), fields.len());
        for (index, field) in fields.iter().enumerate() {
            let entry = &object[&format!("f{index}")];
            match field {
                Field::Signed(v) => prop_assert_eq!(entry.as_i64(), Some(*v)),
                Field::Unsigned(v) => prop_assert_eq!(entry.as_u64(), Some(*v)),
                Field::Real(v) => prop_assert_eq!(entry.as_f64(), Some(*v)),
                Field::Text(v) => prop_assert_eq!(entry.as_str(), Some(v.as_str())),
            }
        }
    }

    #[test]
    fn prop_parsers_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        for format in WireFormat::ALL {
            let buf = ByteBuffer::from(bytes.clone());
            let mut parser = Parser::new(format, buf.read_cursor());
            let _ = parser.parse_string();
            let _ = parser.parse_real();
            let _ = parser.parse_signed();
        }
    }
}
