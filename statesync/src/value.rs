//! Dynamic values for publishable trees.

use schema::FieldType;

/// A value of some [`FieldType`].
///
/// Struct values hold their fields in declaration order; the schema supplies
/// the names. Dictionary entries keep insertion order and unique keys.
///
/// Equality compares reals by bit pattern, so a NaN replica equals the value
/// it was copied from.
#[derive(Debug, Clone)]
pub enum Value {
    Signed(i64),
    Unsigned(u64),
    Real(f64),
    String(String),
    Struct(Vec<Value>),
    Vector(Vec<Value>),
    Dictionary(Vec<(Value, Value)>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Signed(a), Self::Signed(b)) => a == b,
            (Self::Unsigned(a), Self::Unsigned(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Struct(a), Self::Struct(b)) | (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::Dictionary(a), Self::Dictionary(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// The zero value of `ty`: zeros, empty strings and empty vectors.
    #[must_use]
    pub fn default_for(ty: &FieldType) -> Self {
        match ty {
            FieldType::Signed => Self::Signed(0),
            FieldType::Unsigned => Self::Unsigned(0),
            FieldType::Real => Self::Real(0.0),
            FieldType::String => Self::String(String::new()),
            FieldType::Struct(def) => Self::Struct(
                def.fields
                    .iter()
                    .map(|field| Self::default_for(&field.ty))
                    .collect(),
            ),
            FieldType::Vector(_) => Self::Vector(Vec::new()),
            FieldType::Dictionary { .. } => Self::Dictionary(Vec::new()),
        }
    }

    /// Returns `true` if this value has the shape of `ty`, recursively.
    #[must_use]
    pub fn conforms(&self, ty: &FieldType) -> bool {
        match (self, ty) {
            (Self::Signed(_), FieldType::Signed)
            | (Self::Unsigned(_), FieldType::Unsigned)
            | (Self::Real(_), FieldType::Real)
            | (Self::String(_), FieldType::String) => true,
            (Self::Struct(fields), FieldType::Struct(def)) => {
                fields.len() == def.fields.len()
                    && fields
                        .iter()
                        .zip(&def.fields)
                        .all(|(value, field)| value.conforms(&field.ty))
            }
            (Self::Vector(items), FieldType::Vector(element)) => {
                items.iter().all(|item| item.conforms(element))
            }
            (Self::Dictionary(entries), FieldType::Dictionary { key, value }) => {
                entries.iter().enumerate().all(|(index, (k, v))| {
                    k.conforms(key)
                        && v.conforms(value)
                        && entries[..index].iter().all(|(earlier, _)| earlier != k)
                })
            }
            _ => false,
        }
    }

    /// Returns `true` if any real inside is NaN or infinite.
    #[must_use]
    pub fn has_non_finite(&self) -> bool {
        match self {
            Self::Real(value) => !value.is_finite(),
            Self::Struct(items) | Self::Vector(items) => items.iter().any(Self::has_non_finite),
            Self::Dictionary(entries) => entries
                .iter()
                .any(|(key, value)| key.has_non_finite() || value.has_non_finite()),
            Self::Signed(_) | Self::Unsigned(_) | Self::String(_) => false,
        }
    }

    /// Short name used in diagnostics; matches [`FieldType::kind_name`].
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Signed(_) => "signed",
            Self::Unsigned(_) => "unsigned",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Struct(_) => "struct",
            Self::Vector(_) => "vector",
            Self::Dictionary(_) => "dictionary",
        }
    }

    /// Follows an ordinal path through struct fields and vector elements.
    /// Dictionaries are addressed by key, so a path stops at them.
    #[must_use]
    pub fn at(&self, address: &[u64]) -> Option<&Self> {
        address.iter().try_fold(self, |value, &ordinal| {
            let index = usize::try_from(ordinal).ok()?;
            match value {
                Self::Struct(items) | Self::Vector(items) => items.get(index),
                _ => None,
            }
        })
    }

    /// Mutable form of [`Value::at`].
    pub fn at_mut(&mut self, address: &[u64]) -> Option<&mut Self> {
        address.iter().try_fold(self, |value, &ordinal| {
            let index = usize::try_from(ordinal).ok()?;
            match value {
                Self::Struct(items) | Self::Vector(items) => items.get_mut(index),
                _ => None,
            }
        })
    }

    #[must_use]
    pub const fn as_signed(&self) -> Option<i64> {
        match self {
            Self::Signed(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_unsigned(&self) -> Option<u64> {
        match self {
            Self::Unsigned(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_struct(&self) -> Option<&[Self]> {
        match self {
            Self::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&[Self]> {
        match self {
            Self::Vector(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_dictionary(&self) -> Option<&[(Self, Self)]> {
        match self {
            Self::Dictionary(entries) => Some(entries),
            _ => None,
        }
    }

    /// Renders a dictionary key for diagnostics.
    #[must_use]
    pub(crate) fn key_label(&self) -> String {
        match self {
            Self::Signed(value) => value.to_string(),
            Self::Unsigned(value) => value.to_string(),
            Self::String(value) => format!("{value:?}"),
            other => other.kind_name().to_string(),
        }
    }

    /// Looks up the value stored under `key` in a dictionary.
    #[must_use]
    pub fn get(&self, key: &Self) -> Option<&Self> {
        self.as_dictionary()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Signed(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Unsigned(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
