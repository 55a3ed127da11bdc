#![no_main]

use buffer::ReadCursor;
use libfuzzer_sys::fuzz_target;
use schema::{FieldDef, FieldType, Schema, StructDef};
use statesync::{Subscriber, SyncLimits};
use wire::{Limits, Parser, WireFormat};

fn schema() -> Option<Schema> {
    Schema::builder("Root")
        .field(FieldDef::signed("a"))
        .field(FieldDef::string("b"))
        .field(FieldDef::structure(
            "c",
            StructDef::new("C")
                .field(FieldDef::real("x"))
                .field(FieldDef::unsigned("y")),
        ))
        .field(FieldDef::vector("d", FieldType::Signed))
        .field(FieldDef::dictionary("e", FieldType::Unsigned, FieldType::String))
        .build()
        .ok()
}

fuzz_target!(|data: &[u8]| {
    let Some(schema) = schema() else {
        return;
    };
    for format in WireFormat::ALL {
        let mut subscriber = Subscriber::with_limits(schema.clone(), SyncLimits::for_testing());
        let before = subscriber.data().clone();
        let mut parser = Parser::with_limits(format, ReadCursor::new(data), Limits::for_testing());
        if subscriber.apply_message_with_updates(&mut parser).is_err() {
            assert_eq!(subscriber.data(), &before);
        }
    }
});
