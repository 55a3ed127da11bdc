//! Runtime description of publishable data trees.
//!
//! A publishable tree is a root struct whose fields are leaves (signed,
//! unsigned, real, string), nested structs or vectors. The state sync layer
//! walks this description to compose and apply full and incremental updates,
//! and addresses fields by their ordinal position in it.
//!
//! # Design Principles
//!
//! - **Runtime-first** - Trees are described with builders, not derived from Rust types.
//! - **Order is identity** - A field's position, not its name, is its wire address.
//! - **Deterministic hashing** - [`schema_hash`] is stable given the same definition.

mod error;
mod field;
mod hash;
mod schema;

pub use error::{SchemaError, SchemaResult};
pub use field::{FieldDef, FieldType};
pub use hash::schema_hash;
pub use schema::{Schema, SchemaBuilder, StructDef};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let root = StructDef::new("Root").field(FieldDef::signed("value"));
        let schema = Schema::new(root).unwrap();
        let _ = schema_hash(&schema);
        let _: SchemaResult<()> = Ok(());
    }

    #[test]
    fn builder_matches_new() {
        let built = Schema::builder("Root")
            .field(FieldDef::string("name"))
            .field(FieldDef::vector("items", FieldType::Real))
            .build()
            .unwrap();
        let direct = Schema::new(
            StructDef::new("Root")
                .field(FieldDef::string("name"))
                .field(FieldDef::vector("items", FieldType::Real)),
        )
        .unwrap();
        assert_eq!(built, direct);
    }
}
