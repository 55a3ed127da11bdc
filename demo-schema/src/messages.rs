//! Plain messages in generated-code style.

use std::collections::BTreeMap;

use wire::{
    compose_message, Composable, ComposeMessage, Composer, Map, MapMut, Messages, MessagesMut,
    ParseMessage, Parseable, Parser, Primitives, PrimitivesMut, WireResult,
};

pub const MSG_POINT3D: u64 = 1;
pub const MSG_POINT: u64 = 2;
pub const MSG_MESSAGE_ONE: u64 = 3;
pub const MSG_MESSAGE_DICTIONARY: u64 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl ComposeMessage for Point {
    fn compose(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.struct_begin();
        composer.signed_field("x", self.x, true);
        composer.signed_field("y", self.y, false);
        composer.struct_end();
        Ok(())
    }
}

impl ParseMessage for Point {
    fn parse(&mut self, parser: &mut Parser<'_>) -> WireResult<()> {
        parser.struct_begin()?;
        self.x = parser.signed_field("x", true)?;
        self.y = parser.signed_field("y", false)?;
        parser.struct_end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point3D {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl ComposeMessage for Point3D {
    fn compose(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.struct_begin();
        composer.signed_field("x", self.x, true);
        composer.signed_field("y", self.y, true);
        composer.signed_field("z", self.z, false);
        composer.struct_end();
        Ok(())
    }
}

impl ParseMessage for Point3D {
    fn parse(&mut self, parser: &mut Parser<'_>) -> WireResult<()> {
        parser.struct_begin()?;
        self.x = parser.signed_field("x", true)?;
        self.y = parser.signed_field("y", true)?;
        self.z = parser.signed_field("z", false)?;
        parser.struct_end()
    }
}

/// Ten fields covering every primitive, vectors of primitives and structs,
/// and nested structs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageOne {
    pub first_param: i64,
    pub second_param: Vec<i64>,
    pub third_param: Vec<Point3D>,
    pub forth_param: u64,
    pub fifth_param: String,
    pub sixth_param: Vec<Point>,
    pub seventh_param: f64,
    pub eighth_param: Point,
    pub nineth_param: Point3D,
    pub tenth_param: Vec<f64>,
}

impl ComposeMessage for MessageOne {
    fn compose(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.struct_begin();
        composer.signed_field("firstParam", self.first_param, true);
        composer.composable_field(
            "secondParam",
            Composable::Collection(&Primitives(&self.second_param)),
            true,
        )?;
        composer.composable_field(
            "thirdParam",
            Composable::Collection(&Messages(&self.third_param)),
            true,
        )?;
        composer.unsigned_field("forthParam", self.forth_param, true);
        composer.string_field("fifthParam", &self.fifth_param, true);
        composer.composable_field(
            "sixthParam",
            Composable::Collection(&Messages(&self.sixth_param)),
            true,
        )?;
        composer.real_field("seventhParam", self.seventh_param, true)?;
        composer.composable_field("eighthParam", Composable::Message(&self.eighth_param), true)?;
        composer.composable_field("ninethParam", Composable::Message(&self.nineth_param), true)?;
        composer.composable_field(
            "tenthParam",
            Composable::Collection(&Primitives(&self.tenth_param)),
            false,
        )?;
        composer.struct_end();
        Ok(())
    }
}

impl ParseMessage for MessageOne {
    fn parse(&mut self, parser: &mut Parser<'_>) -> WireResult<()> {
        parser.struct_begin()?;
        self.first_param = parser.signed_field("firstParam", true)?;
        self.second_param.clear();
        parser.parseable_field(
            "secondParam",
            Parseable::Collection(&mut PrimitivesMut(&mut self.second_param)),
            true,
        )?;
        self.third_param.clear();
        parser.parseable_field(
            "thirdParam",
            Parseable::Collection(&mut MessagesMut(&mut self.third_param)),
            true,
        )?;
        self.forth_param = parser.unsigned_field("forthParam", true)?;
        self.fifth_param = parser.string_field("fifthParam", true)?;
        self.sixth_param.clear();
        parser.parseable_field(
            "sixthParam",
            Parseable::Collection(&mut MessagesMut(&mut self.sixth_param)),
            true,
        )?;
        self.seventh_param = parser.real_field("seventhParam", true)?;
        parser.parseable_field("eighthParam", Parseable::Message(&mut self.eighth_param), true)?;
        parser.parseable_field("ninethParam", Parseable::Message(&mut self.nineth_param), true)?;
        self.tenth_param.clear();
        parser.parseable_field(
            "tenthParam",
            Parseable::Collection(&mut PrimitivesMut(&mut self.tenth_param)),
            false,
        )?;
        parser.struct_end()
    }
}

pub fn compose_point3d(composer: &mut Composer<'_>, point: &Point3D) -> WireResult<()> {
    compose_message(composer, MSG_POINT3D, point)
}

pub fn compose_point(composer: &mut Composer<'_>, point: &Point) -> WireResult<()> {
    compose_message(composer, MSG_POINT, point)
}

pub fn compose_message_one(composer: &mut Composer<'_>, message: &MessageOne) -> WireResult<()> {
    compose_message(composer, MSG_MESSAGE_ONE, message)
}

/// A single string-to-string dictionary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageDictionary {
    pub dictionary_one: BTreeMap<String, String>,
}

impl ComposeMessage for MessageDictionary {
    fn compose(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.struct_begin();
        composer.composable_field(
            "dictionary_one",
            Composable::Collection(&Map::new(&self.dictionary_one)),
            false,
        )?;
        composer.struct_end();
        Ok(())
    }
}

impl ParseMessage for MessageDictionary {
    fn parse(&mut self, parser: &mut Parser<'_>) -> WireResult<()> {
        parser.struct_begin()?;
        self.dictionary_one.clear();
        parser.parseable_field(
            "dictionary_one",
            Parseable::Collection(&mut MapMut(&mut self.dictionary_one)),
            false,
        )?;
        parser.struct_end()
    }
}

pub fn compose_message_dictionary(
    composer: &mut Composer<'_>,
    message: &MessageDictionary,
) -> WireResult<()> {
    compose_message(composer, MSG_MESSAGE_DICTIONARY, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buffer::ByteBuffer;

    #[test]
    fn point_json_layout() {
        let mut buf = ByteBuffer::new();
        Point { x: 1, y: -2 }
            .compose(&mut Composer::json(&mut buf))
            .unwrap();
        assert_eq!(buf.as_bytes(), br#"{"x":1,"y":-2}"#);
    }

    #[test]
    fn point3d_gmq_is_three_varints() {
        let mut buf = ByteBuffer::new();
        Point3D { x: 1, y: -1, z: 64 }
            .compose(&mut Composer::gmq(&mut buf))
            .unwrap();
        assert_eq!(buf.as_bytes(), &[2, 1, 0x80, 0x01]);
    }

    #[test]
    fn dictionary_json_layout() {
        let mut message = MessageDictionary::default();
        message
            .dictionary_one
            .insert("red".to_string(), "blue".to_string());
        let mut buf = ByteBuffer::new();
        message.compose(&mut Composer::json(&mut buf)).unwrap();
        assert_eq!(
            buf.as_bytes(),
            br#"{"dictionary_one":{"size":1,"data":[{"key":"red","value":"blue"}]}}"#
        );
    }

    #[test]
    fn parse_replaces_previous_collections() {
        let source = MessageOne {
            second_param: vec![1, 2],
            ..MessageOne::default()
        };
        let mut buf = ByteBuffer::new();
        source.compose(&mut Composer::gmq(&mut buf)).unwrap();

        let mut target = MessageOne {
            second_param: vec![9, 9, 9],
            ..MessageOne::default()
        };
        target
            .parse(&mut Parser::gmq(buf.read_cursor()))
            .unwrap();
        assert_eq!(target, source);
    }
}
