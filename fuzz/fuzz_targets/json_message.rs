#![no_main]

use buffer::ReadCursor;
use libfuzzer_sys::fuzz_target;
use wire::{
    handle_message, HandlerTable, Limits, MessageHandler, Parseable, Parser, PrimitivesMut,
    WireFormat,
};

fuzz_target!(|data: &[u8]| {
    for format in WireFormat::ALL {
        let mut table = match HandlerTable::build([
            MessageHandler::new(1, |parser: &mut Parser<'_>| {
                let mut values: Vec<i64> = Vec::new();
                parser.parse(Parseable::Collection(&mut PrimitivesMut(&mut values)))
            }),
            MessageHandler::new(2, |parser: &mut Parser<'_>| {
                parser.parse_string().map(drop)
            }),
            MessageHandler::fallback(|parser: &mut Parser<'_>| {
                parser.parse_real().map(drop)
            }),
        ]) {
            Ok(table) => table,
            Err(_) => return,
        };
        let mut parser = Parser::with_limits(format, ReadCursor::new(data), Limits::for_testing());
        let _ = handle_message(&mut parser, &mut table);
    }
});
