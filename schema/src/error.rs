//! Schema validation errors.

use std::fmt;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when building or validating a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A struct or field has an empty name.
    EmptyName { parent: String },

    /// Two fields of one struct share a name.
    DuplicateFieldName { struct_name: String, field: String },

    /// A vector's element type is itself a vector.
    NestedVector { field: String },

    /// A dictionary key is not an integer or a string.
    InvalidDictionaryKey { field: String, key: &'static str },

    /// A vector or dictionary directly holds a dictionary, or a dictionary
    /// holds a vector.
    NestedCollection { field: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName { parent } => write!(f, "empty name inside '{parent}'"),
            Self::DuplicateFieldName { struct_name, field } => {
                write!(f, "duplicate field '{field}' in struct '{struct_name}'")
            }
            Self::NestedVector { field } => {
                write!(f, "field '{field}' is a vector of vectors")
            }
            Self::InvalidDictionaryKey { field, key } => {
                write!(f, "dictionary '{field}' cannot be keyed by {key}")
            }
            Self::NestedCollection { field } => {
                write!(f, "field '{field}' nests a collection inside another collection")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
