//! Deterministic schema hashing.

use blake3::Hasher;

use crate::{FieldType, Schema, StructDef};

/// Computes a deterministic fingerprint of a schema's layout.
///
/// Names and types both feed the hash, so publisher and subscriber can check
/// they agree on the tree before exchanging addressed updates.
#[must_use]
pub fn schema_hash(schema: &Schema) -> u64 {
    let mut hasher = Hasher::new();
    write_struct(&mut hasher, schema.root());

    let hash = hasher.finalize();
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(prefix)
}

fn write_struct(hasher: &mut Hasher, def: &StructDef) {
    write_str(hasher, &def.name);
    write_len(hasher, def.fields.len());
    for field in &def.fields {
        write_str(hasher, &field.name);
        write_type(hasher, &field.ty);
    }
}

fn write_type(hasher: &mut Hasher, ty: &FieldType) {
    match ty {
        FieldType::Signed => write_u8(hasher, 0),
        FieldType::Unsigned => write_u8(hasher, 1),
        FieldType::Real => write_u8(hasher, 2),
        FieldType::String => write_u8(hasher, 3),
        FieldType::Struct(def) => {
            write_u8(hasher, 4);
            write_struct(hasher, def);
        }
        FieldType::Vector(element) => {
            write_u8(hasher, 5);
            write_type(hasher, element);
        }
        FieldType::Dictionary { key, value } => {
            write_u8(hasher, 6);
            write_type(hasher, key);
            write_type(hasher, value);
        }
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_len(hasher: &mut Hasher, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldDef;

    fn schema(fields: Vec<FieldDef>) -> Schema {
        Schema::new(StructDef::with_fields("Root", fields)).unwrap()
    }

    #[test]
    fn schema_hash_is_stable() {
        let a = schema(vec![FieldDef::signed("x"), FieldDef::string("s")]);
        let b = schema(vec![FieldDef::signed("x"), FieldDef::string("s")]);
        assert_eq!(schema_hash(&a), schema_hash(&b));
    }

    #[test]
    fn schema_hash_sensitive_to_order() {
        let a = schema(vec![FieldDef::signed("x"), FieldDef::signed("y")]);
        let b = schema(vec![FieldDef::signed("y"), FieldDef::signed("x")]);
        assert_ne!(schema_hash(&a), schema_hash(&b));
    }

    #[test]
    fn schema_hash_sensitive_to_type() {
        let a = schema(vec![FieldDef::signed("x")]);
        let b = schema(vec![FieldDef::unsigned("x")]);
        let c = schema(vec![FieldDef::vector("x", FieldType::Signed)]);
        let d = schema(vec![FieldDef::dictionary(
            "x",
            FieldType::Signed,
            FieldType::Signed,
        )]);
        let e = schema(vec![FieldDef::dictionary(
            "x",
            FieldType::String,
            FieldType::Signed,
        )]);
        assert_ne!(schema_hash(&a), schema_hash(&b));
        assert_ne!(schema_hash(&a), schema_hash(&c));
        assert_ne!(schema_hash(&c), schema_hash(&d));
        assert_ne!(schema_hash(&d), schema_hash(&e));
    }

    #[test]
    fn name_boundaries_do_not_collide() {
        let a = schema(vec![FieldDef::signed("ab"), FieldDef::signed("c")]);
        let b = schema(vec![FieldDef::signed("a"), FieldDef::signed("bc")]);
        assert_ne!(schema_hash(&a), schema_hash(&b));
    }
}
