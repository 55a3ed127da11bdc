//! Struct definitions, schema validation and the schema builder.

use std::collections::HashSet;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldDef, FieldType};

/// An ordered list of named fields.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    /// Creates a struct with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Creates a struct with the provided fields.
    #[must_use]
    pub fn with_fields(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Ordinal of the field called `name`.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    fn validate(&self) -> SchemaResult<()> {
        if self.name.is_empty() {
            return Err(SchemaError::EmptyName {
                parent: "<schema>".to_string(),
            });
        }
        let mut names = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyName {
                    parent: self.name.clone(),
                });
            }
            if !names.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName {
                    struct_name: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            validate_type(&field.name, &field.ty)?;
        }
        Ok(())
    }
}

fn validate_type(field: &str, ty: &FieldType) -> SchemaResult<()> {
    match ty {
        FieldType::Struct(def) => def.validate(),
        FieldType::Vector(element) => match element.as_ref() {
            FieldType::Vector(_) => Err(SchemaError::NestedVector {
                field: field.to_string(),
            }),
            FieldType::Dictionary { .. } => Err(SchemaError::NestedCollection {
                field: field.to_string(),
            }),
            other => validate_type(field, other),
        },
        FieldType::Dictionary { key, value } => {
            if !matches!(
                key.as_ref(),
                FieldType::Signed | FieldType::Unsigned | FieldType::String
            ) {
                return Err(SchemaError::InvalidDictionaryKey {
                    field: field.to_string(),
                    key: key.kind_name(),
                });
            }
            if value.is_collection() {
                return Err(SchemaError::NestedCollection {
                    field: field.to_string(),
                });
            }
            validate_type(field, value)
        }
        FieldType::Signed | FieldType::Unsigned | FieldType::Real | FieldType::String => Ok(()),
    }
}

/// A validated publishable tree rooted at one struct.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "StructDef", into = "StructDef")
)]
pub struct Schema {
    root: StructDef,
}

impl Schema {
    /// Creates a schema after validation.
    pub fn new(root: StructDef) -> SchemaResult<Self> {
        root.validate()?;
        Ok(Self { root })
    }

    /// Creates a schema builder for a root struct called `name`.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            root: StructDef::new(name),
        }
    }

    #[must_use]
    pub const fn root(&self) -> &StructDef {
        &self.root
    }
}

impl TryFrom<StructDef> for Schema {
    type Error = SchemaError;

    fn try_from(root: StructDef) -> SchemaResult<Self> {
        Self::new(root)
    }
}

impl From<Schema> for StructDef {
    fn from(schema: Schema) -> Self {
        schema.root
    }
}

/// Builder for `Schema`.
#[derive(Debug)]
pub struct SchemaBuilder {
    root: StructDef,
}

impl SchemaBuilder {
    /// Adds a root field.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.root.fields.push(field);
        self
    }

    /// Builds the schema after validation.
    pub fn build(self) -> SchemaResult<Schema> {
        Schema::new(self.root)
    }
}
