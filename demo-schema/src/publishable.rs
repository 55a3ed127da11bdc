//! The `StructSix` publishable tree.

use schema::{FieldDef, Schema, StructDef};
use statesync::Value;

/// One field of each leaf kind.
pub fn basic_types_def() -> StructDef {
    StructDef::new("BasicTypes")
        .field(FieldDef::signed("anInt"))
        .field(FieldDef::unsigned("anUInt"))
        .field(FieldDef::real("aReal"))
        .field(FieldDef::string("aString"))
}

/// A root with a leaf, a scalar sub-struct, and an aggregate holding another sub-struct.
pub fn struct_six_schema() -> Schema {
    let aggregate = StructDef::new("AggregateType")
        .field(FieldDef::string("name"))
        .field(FieldDef::structure("theAggregate", basic_types_def()))
        .field(FieldDef::signed("lastValue"));

    Schema::new(
        StructDef::new("StructSix")
            .field(FieldDef::string("name"))
            .field(FieldDef::structure("basic", basic_types_def()))
            .field(FieldDef::structure("aggregate", aggregate)),
    )
    .expect("StructSix schema must be valid")
}

fn basic_types(an_int: i64, an_uint: u64, a_real: f64, a_string: &str) -> Value {
    Value::Struct(vec![
        Value::Signed(an_int),
        Value::Unsigned(an_uint),
        Value::Real(a_real),
        a_string.into(),
    ])
}

/// The populated `StructSix` value the publish/subscribe scenarios start from.
#[allow(clippy::approx_constant)]
pub fn struct_six_value() -> Value {
    Value::Struct(vec![
        "TheName".into(),
        basic_types(-100_000, 100_000, 3.14, "basic string"),
        Value::Struct(vec![
            "aggregate name".into(),
            basic_types(-100, 100, 100.0, "basic string inside aggregate"),
            Value::Signed(0),
        ]),
    ])
}
