//! Field types and definitions.

use crate::schema::StructDef;

/// The type of one field in a publishable tree.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldType {
    Signed,
    Unsigned,
    Real,
    String,
    Struct(StructDef),
    /// Ordered sequence of leaves or structs.
    Vector(Box<FieldType>),
    /// Keyed collection. Keys are integers or strings; values are leaves or
    /// structs.
    Dictionary {
        key: Box<FieldType>,
        value: Box<FieldType>,
    },
}

impl FieldType {
    /// Creates a vector of `element`.
    #[must_use]
    pub fn vector(element: Self) -> Self {
        Self::Vector(Box::new(element))
    }

    /// Creates a dictionary from `key` to `value`.
    #[must_use]
    pub fn dictionary(key: Self, value: Self) -> Self {
        Self::Dictionary {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Returns `true` for vectors and dictionaries.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Vector(_) | Self::Dictionary { .. })
    }

    /// Returns `true` for signed, unsigned, real and string.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Signed | Self::Unsigned | Self::Real | Self::String
        )
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Signed => "signed",
            Self::Unsigned => "unsigned",
            Self::Real => "real",
            Self::String => "string",
            Self::Struct(_) => "struct",
            Self::Vector(_) => "vector",
            Self::Dictionary { .. } => "dictionary",
        }
    }
}

/// A named field.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
}

impl FieldDef {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    #[must_use]
    pub fn signed(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Signed)
    }

    #[must_use]
    pub fn unsigned(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Unsigned)
    }

    #[must_use]
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Real)
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    #[must_use]
    pub fn structure(name: impl Into<String>, def: StructDef) -> Self {
        Self::new(name, FieldType::Struct(def))
    }

    #[must_use]
    pub fn vector(name: impl Into<String>, element: FieldType) -> Self {
        Self::new(name, FieldType::vector(element))
    }

    #[must_use]
    pub fn dictionary(name: impl Into<String>, key: FieldType, value: FieldType) -> Self {
        Self::new(name, FieldType::dictionary(key, value))
    }
}
