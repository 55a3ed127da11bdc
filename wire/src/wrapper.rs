//! Value wrappers: the seam between message traversal and format framing.
//!
//! A format owns framing (counts, brackets, separators). A wrapper owns what
//! happens per element or per nested message. Wrappers borrow the caller's
//! storage for the duration of one compose or parse call and never own it.

use std::collections::BTreeMap;

use crate::composer::Composer;
use crate::error::{WireError, WireResult};
use crate::parser::Parser;

/// A struct that can write its own fields.
pub trait ComposeMessage {
    fn compose(&self, composer: &mut Composer<'_>) -> WireResult<()>;
}

/// A struct that can read its own fields.
pub trait ParseMessage {
    fn parse(&mut self, parser: &mut Parser<'_>) -> WireResult<()>;
}

/// A sequence the composer can count and walk by ordinal.
pub trait ComposeCollection {
    fn size(&self) -> usize;
    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()>;
}

/// A sink for parsed elements.
pub trait ParseCollection {
    /// Called once with the declared count when the format provides one.
    fn size_hint(&mut self, _size: usize) {}
    fn parse_element(&mut self, parser: &mut Parser<'_>, ordinal: usize) -> WireResult<()>;
}

/// Something a composer can write: a collection or a nested message.
#[derive(Clone, Copy)]
pub enum Composable<'a> {
    Collection(&'a dyn ComposeCollection),
    Message(&'a dyn ComposeMessage),
}

/// Something a parser can fill: a collection or a nested message.
pub enum Parseable<'a> {
    Collection(&'a mut dyn ParseCollection),
    Message(&'a mut dyn ParseMessage),
}

/// A scalar with a direct composer/parser operation.
pub trait Primitive: Sized {
    fn compose_into(&self, composer: &mut Composer<'_>) -> WireResult<()>;
    fn parse_from(parser: &mut Parser<'_>) -> WireResult<Self>;
}

macro_rules! signed_primitive {
    ($($ty:ty),*) => {$(
        impl Primitive for $ty {
            fn compose_into(&self, composer: &mut Composer<'_>) -> WireResult<()> {
                composer.compose_signed(i64::from(*self));
                Ok(())
            }

            fn parse_from(parser: &mut Parser<'_>) -> WireResult<Self> {
                let value = parser.parse_signed()?;
                Self::try_from(value).map_err(|_| WireError::ValueOutOfRange {
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

macro_rules! unsigned_primitive {
    ($($ty:ty),*) => {$(
        impl Primitive for $ty {
            fn compose_into(&self, composer: &mut Composer<'_>) -> WireResult<()> {
                composer.compose_unsigned(u64::from(*self));
                Ok(())
            }

            fn parse_from(parser: &mut Parser<'_>) -> WireResult<Self> {
                let value = parser.parse_unsigned()?;
                Self::try_from(value).map_err(|_| WireError::ValueOutOfRange {
                    target: stringify!($ty),
                })
            }
        }
    )*};
}

signed_primitive!(i8, i16, i32, i64);
unsigned_primitive!(u8, u16, u32, u64);

impl Primitive for f64 {
    fn compose_into(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.compose_real(*self)
    }

    fn parse_from(parser: &mut Parser<'_>) -> WireResult<Self> {
        parser.parse_real()
    }
}

impl Primitive for f32 {
    fn compose_into(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.compose_real(f64::from(*self))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn parse_from(parser: &mut Parser<'_>) -> WireResult<Self> {
        let value = parser.parse_real()?;
        let narrowed = value as Self;
        if value.is_finite() && !narrowed.is_finite() {
            return Err(WireError::ValueOutOfRange { target: "f32" });
        }
        Ok(narrowed)
    }
}

impl Primitive for String {
    fn compose_into(&self, composer: &mut Composer<'_>) -> WireResult<()> {
        composer.compose_string(self);
        Ok(())
    }

    fn parse_from(parser: &mut Parser<'_>) -> WireResult<Self> {
        parser.parse_string()
    }
}

/// Pre-allocation cap for declared counts; the rest grows on demand.
const MAX_RESERVE: usize = 1024;

/// Composes a slice of primitives as a collection.
pub struct Primitives<'a, T>(pub &'a [T]);

impl<T: Primitive> ComposeCollection for Primitives<'_, T> {
    fn size(&self) -> usize {
        self.0.len()
    }

    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()> {
        self.0[ordinal].compose_into(composer)
    }
}

/// Appends parsed primitives to a vector.
pub struct PrimitivesMut<'a, T>(pub &'a mut Vec<T>);

impl<T: Primitive> ParseCollection for PrimitivesMut<'_, T> {
    fn size_hint(&mut self, size: usize) {
        self.0.reserve(size.min(MAX_RESERVE));
    }

    fn parse_element(&mut self, parser: &mut Parser<'_>, _ordinal: usize) -> WireResult<()> {
        self.0.push(T::parse_from(parser)?);
        Ok(())
    }
}

/// Composes a slice of nested messages as a collection.
pub struct Messages<'a, T>(pub &'a [T]);

impl<T: ComposeMessage> ComposeCollection for Messages<'_, T> {
    fn size(&self) -> usize {
        self.0.len()
    }

    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()> {
        self.0[ordinal].compose(composer)
    }
}

/// Appends parsed nested messages to a vector, starting each from `T::default()`.
pub struct MessagesMut<'a, T>(pub &'a mut Vec<T>);

impl<T: ParseMessage + Default> ParseCollection for MessagesMut<'_, T> {
    fn size_hint(&mut self, size: usize) {
        self.0.reserve(size.min(MAX_RESERVE));
    }

    fn parse_element(&mut self, parser: &mut Parser<'_>, _ordinal: usize) -> WireResult<()> {
        let mut element = T::default();
        element.parse(parser)?;
        self.0.push(element);
        Ok(())
    }
}

/// Composes key/value pairs of primitives as a dictionary.
///
/// Entries are written in the order the source yields them.
pub struct Map<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
}

impl<'a, K, V> Map<'a, K, V> {
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (&'a K, &'a V)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl<K: Primitive, V: Primitive> ComposeCollection for Map<'_, K, V> {
    fn size(&self) -> usize {
        self.entries.len()
    }

    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()> {
        let (key, value) = self.entries[ordinal];
        composer.compose_entry(|c| key.compose_into(c), |c| value.compose_into(c))
    }
}

/// Inserts parsed primitive pairs into a map. A repeated key is an error.
pub struct MapMut<'a, K, V>(pub &'a mut BTreeMap<K, V>);

impl<K: Primitive + Ord, V: Primitive> ParseCollection for MapMut<'_, K, V> {
    fn parse_element(&mut self, parser: &mut Parser<'_>, ordinal: usize) -> WireResult<()> {
        let (key, value) = parser.parse_entry(K::parse_from, V::parse_from)?;
        insert_unique(self.0, key, value, ordinal)
    }
}

/// Composes primitive keys mapped to nested messages.
pub struct MessageMap<'a, K, V> {
    entries: Vec<(&'a K, &'a V)>,
}

impl<'a, K, V> MessageMap<'a, K, V> {
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (&'a K, &'a V)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

impl<K: Primitive, V: ComposeMessage> ComposeCollection for MessageMap<'_, K, V> {
    fn size(&self) -> usize {
        self.entries.len()
    }

    fn compose_element(&self, composer: &mut Composer<'_>, ordinal: usize) -> WireResult<()> {
        let (key, value) = self.entries[ordinal];
        composer.compose_entry(|c| key.compose_into(c), |c| value.compose(c))
    }
}

/// Inserts parsed keys and nested messages into a map, starting each message
/// from `V::default()`.
pub struct MessageMapMut<'a, K, V>(pub &'a mut BTreeMap<K, V>);

impl<K: Primitive + Ord, V: ParseMessage + Default> ParseCollection for MessageMapMut<'_, K, V> {
    fn parse_element(&mut self, parser: &mut Parser<'_>, ordinal: usize) -> WireResult<()> {
        let (key, value) = parser.parse_entry(K::parse_from, |p| {
            let mut value = V::default();
            value.parse(p)?;
            Ok(value)
        })?;
        insert_unique(self.0, key, value, ordinal)
    }
}

fn insert_unique<K: Ord, V>(
    map: &mut BTreeMap<K, V>,
    key: K,
    value: V,
    ordinal: usize,
) -> WireResult<()> {
    if map.contains_key(&key) {
        return Err(WireError::DuplicateKey { ordinal });
    }
    map.insert(key, value);
    Ok(())
}
